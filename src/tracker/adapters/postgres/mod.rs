//! `PostgreSQL` adapters for tracker persistence.
//!
//! Aggregates map to one table each. An issue's labels and activity log are
//! stored as JSONB columns on the issue row, and cascading deletes run in a
//! single transaction.

pub(crate) mod mapping;
pub(crate) mod models;
mod repository;
mod schema;

pub use repository::{PostgresTrackerStore, TrackerPgPool};
