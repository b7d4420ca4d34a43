//! Leadtrack Domain Library
//!
//! Core domain types, metric calculations and repository interfaces for
//! tracking purchased lead packages and the outbound calls made against them.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain/`): Pure business entities and logic
//!   - `entities/`: Core domain models (LeadPackage, DialTask, Call, CallTag, summaries)
//!   - `value_objects/`: Immutable value types (CallResult, TaskStatus, DateRange, ...)
//!   - `services/`: Metrics engine and dashboard analytics
//!   - `errors/`: Domain-specific error types
//!
//! - **Ports** (`ports/`): Abstract interfaces (traits)
//!   - `repositories/`: Data access interfaces
//!
//! Every calculation takes its inputs as snapshots plus an explicit point in
//! time, so re-running it against the same snapshot gives the same output.
//!
//! # Usage
//!
//! ```rust,ignore
//! use leadtrack::domain::{LeadPackage, metrics};
//! use leadtrack::ports::PackageRepository;
//! ```

pub mod domain;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    analytics, metrics, Call, CallResult, CallTag, DateRange, DialTask, DialTaskChanges,
    DomainError, InterestPolicy, LeadPackage, LeadPackageChanges, MetricsSummary, NewCall,
    NewCallTag, NewDialTask, NewLeadPackage, PackageCallStats, PackageTagSummary, PageRequest,
    Pagination, TagType, TaskStatus, TrendPoint,
};
pub use ports::{
    CallRepository, MetricsRepository, PackageFilter, PackageRepository, TaskRepository,
};
