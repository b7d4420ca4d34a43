//! Application Layer (Use Cases)
//!
//! Loads snapshots through the repository ports, runs the metric
//! calculations and writes the results back.

mod analytics_service;
mod metrics_service;
mod package_service;
mod task_service;

pub use analytics_service::AnalyticsService;
pub use metrics_service::MetricsService;
pub use package_service::PackageService;
pub use task_service::TaskService;
