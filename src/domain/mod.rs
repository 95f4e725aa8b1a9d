//! Domain layer types and invariants.

pub mod leaderboard;
pub mod records;
pub mod resources;
