//! Domain Entities
//!
//! Pure domain models without infrastructure dependencies.
//! - LeadPackage: A purchased batch of sales leads
//! - DialTask: One outbound calling campaign against a package
//! - Call: A single dial attempt
//! - CallTag: Qualitative label attached to a call
//! - PackageTagSummary: Per-package tag distribution
//! - MetricsSummary: Daily aggregated figures

mod call;
mod call_tag;
mod dial_task;
mod lead_package;
mod metrics_summary;
mod package_tag_summary;

pub use call::*;
pub use call_tag::*;
pub use dial_task::*;
pub use lead_package::*;
pub use metrics_summary::*;
pub use package_tag_summary::*;
