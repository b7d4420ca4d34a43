//! Analytics Application Service (Use Case)
//!
//! Lead stock and calling progress widgets.

use std::sync::Arc;

use chrono::NaiveDate;

use leadtrack::analytics::{
    self, ConnectRateAnalysis, MonthConsumption, PackageProgress, RemainingLeads,
};
use leadtrack::{DomainError, PackageRepository, TaskRepository};

/// Application service for read-only package analytics
pub struct AnalyticsService<P: PackageRepository, T: TaskRepository> {
    packages: Arc<P>,
    tasks: Arc<T>,
}

impl<P: PackageRepository, T: TaskRepository> AnalyticsService<P, T> {
    pub fn new(packages: Arc<P>, tasks: Arc<T>) -> Self {
        Self { packages, tasks }
    }

    pub async fn remaining(&self, threshold: i64) -> Result<RemainingLeads, DomainError> {
        let packages = self.packages.find_all().await?;
        let tasks = self.tasks.find_all().await?;

        let remaining = analytics::remaining_leads(&packages, &tasks, threshold);
        if remaining.warning.is_low {
            tracing::warn!(
                total_remaining = remaining.total_remaining,
                threshold,
                "Remaining lead stock below threshold"
            );
        }

        Ok(remaining)
    }

    pub async fn consumption(&self, today: NaiveDate) -> Result<MonthConsumption, DomainError> {
        let packages = self.packages.find_all().await?;
        let tasks = self.tasks.find_all().await?;
        Ok(analytics::month_consumption(&packages, &tasks, today))
    }

    pub async fn progress(&self) -> Result<PackageProgress, DomainError> {
        let packages = self.packages.find_all().await?;
        let tasks = self.tasks.find_all().await?;
        Ok(analytics::package_progress(&packages, &tasks))
    }

    pub async fn connect_rate(&self, today: NaiveDate) -> Result<ConnectRateAnalysis, DomainError> {
        let packages = self.packages.find_all().await?;
        let tasks = self.tasks.find_all().await?;
        Ok(analytics::connect_rate_analysis(&packages, &tasks, today))
    }
}
