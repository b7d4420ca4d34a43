//! Infrastructure Adapters
//!
//! Implementations of domain ports for external systems.

#[cfg(test)]
pub mod in_memory;
pub mod postgres;

// Re-exports
#[cfg(test)]
pub use in_memory::InMemoryStore;
pub use postgres::{PgCallRepository, PgMetricsRepository, PgPackageRepository, PgTaskRepository};
