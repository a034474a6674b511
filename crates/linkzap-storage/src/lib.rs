//! Durable storage for link records.
//!
//! [`PostgresLinkStore`] is the system of record; [`InMemoryLinkStore`]
//! serves tests and single-process runs.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryLinkStore;
pub use postgres::PostgresLinkStore;
