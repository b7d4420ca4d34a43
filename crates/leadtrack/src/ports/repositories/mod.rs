//! Repository Ports
//!
//! Abstract interfaces for data persistence operations.

mod call_repository;
mod metrics_repository;
mod package_repository;
mod task_repository;

pub use call_repository::*;
pub use metrics_repository::*;
pub use package_repository::*;
pub use task_repository::*;
