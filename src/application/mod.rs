//! Application layer: repository seams and process-level errors.

pub mod error;
pub mod repos;
