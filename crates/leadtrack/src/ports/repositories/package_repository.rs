//! Lead Package Repository Port

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{errors::DomainError, LeadPackage, PageRequest};

/// Optional equality filters for package listings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageFilter {
    pub source: Option<String>,
    pub industry: Option<String>,
    pub region: Option<String>,
}

impl PackageFilter {
    pub fn matches(&self, package: &LeadPackage) -> bool {
        fn eq(wanted: &Option<String>, actual: Option<&str>) -> bool {
            wanted.as_deref().map_or(true, |w| actual == Some(w))
        }

        eq(&self.source, Some(package.source.as_str()))
            && eq(&self.industry, package.industry.as_deref())
            && eq(&self.region, package.region.as_deref())
    }
}

/// Repository interface for LeadPackage entities
#[async_trait]
pub trait PackageRepository: Send + Sync {
    /// Find a package by ID
    async fn find_by_id(&self, id: i32) -> Result<Option<LeadPackage>, DomainError>;

    /// Find all packages, newest first
    async fn find_all(&self) -> Result<Vec<LeadPackage>, DomainError>;

    /// One page of packages matching `filter`, newest first, with the
    /// total number of matching rows
    async fn find_page(
        &self,
        filter: &PackageFilter,
        page: &PageRequest,
    ) -> Result<(Vec<LeadPackage>, u64), DomainError>;

    /// Write back total_cost, contact_rate, interest_rate and updated_at
    async fn save_metrics(&self, package: &LeadPackage) -> Result<LeadPackage, DomainError>;

    /// Insert a new package; the returned copy carries the assigned id
    async fn insert(&self, package: &LeadPackage) -> Result<LeadPackage, DomainError>;

    /// Overwrite every stored column of an existing package
    async fn update(&self, package: &LeadPackage) -> Result<LeadPackage, DomainError>;

    /// Delete a package together with its tasks, calls, tags and tag summaries
    async fn delete(&self, id: i32) -> Result<(), DomainError>;
}
