//! Metrics Repository Port
//!
//! Persistence for derived rows: daily summaries and per-package tag summaries.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{errors::DomainError, MetricsSummary, PackageTagSummary};

/// Repository interface for derived metric rows
#[async_trait]
pub trait MetricsRepository: Send + Sync {
    /// Summary for one day
    async fn find_summary(&self, date: NaiveDate) -> Result<Option<MetricsSummary>, DomainError>;

    /// Summaries within the optional inclusive bounds, newest first
    async fn find_summaries(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<MetricsSummary>, DomainError>;

    /// Insert or update the summary for its date (one row per date)
    async fn upsert_summary(&self, summary: &MetricsSummary) -> Result<MetricsSummary, DomainError>;

    /// Tag summaries of a package
    async fn find_tag_summaries(
        &self,
        package_id: i32,
    ) -> Result<Vec<PackageTagSummary>, DomainError>;

    /// Delete every tag summary of the package and insert `rows`, atomically
    async fn replace_tag_summaries(
        &self,
        package_id: i32,
        rows: &[PackageTagSummary],
    ) -> Result<Vec<PackageTagSummary>, DomainError>;
}
