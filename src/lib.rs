//! Cerahati donation API: read-through Redis cache over the Postgres store.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
