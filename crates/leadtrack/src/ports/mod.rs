//! Ports (Interfaces)
//!
//! Abstract interfaces that define how the domain layer
//! reaches the lead database.
//!
//! Implementations of these traits live in the binary crate.

pub mod repositories;

// Re-exports
pub use repositories::*;
