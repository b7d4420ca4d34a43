//! Lead Package Application Service (Use Case)
//!
//! Registration, edits, listing, detail views and metric recomputation for
//! lead packages, plus scheduling dial tasks against them.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use leadtrack::analytics::{self, PackageStats};
use leadtrack::metrics;
use leadtrack::{
    CallRepository, DialTask, DomainError, LeadPackage, LeadPackageChanges, MetricsRepository,
    NewDialTask, NewLeadPackage, PackageCallStats, PackageFilter, PackageRepository,
    PageRequest, Pagination, TaskRepository,
};

/// Application service for lead package operations
pub struct PackageService<P, T, C, M>
where
    P: PackageRepository,
    T: TaskRepository,
    C: CallRepository,
    M: MetricsRepository,
{
    packages: Arc<P>,
    tasks: Arc<T>,
    calls: Arc<C>,
    metrics: Arc<M>,
}

impl<P, T, C, M> PackageService<P, T, C, M>
where
    P: PackageRepository,
    T: TaskRepository,
    C: CallRepository,
    M: MetricsRepository,
{
    pub fn new(packages: Arc<P>, tasks: Arc<T>, calls: Arc<C>, metrics: Arc<M>) -> Self {
        Self {
            packages,
            tasks,
            calls,
            metrics,
        }
    }

    /// One page of packages, newest first
    pub async fn list(
        &self,
        filter: &PackageFilter,
        page: PageRequest,
    ) -> Result<(Vec<LeadPackage>, Pagination), DomainError> {
        let (packages, total) = self.packages.find_page(filter, &page).await?;
        Ok((packages, page.paginate(total)))
    }

    pub async fn get(&self, id: i32) -> Result<LeadPackage, DomainError> {
        self.packages
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("LeadPackage", id))
    }

    /// Register a package with its derived cost and estimated contact rate
    pub async fn create(
        &self,
        draft: NewLeadPackage,
        now: DateTime<Utc>,
    ) -> Result<LeadPackage, DomainError> {
        let mut package = LeadPackage::new(draft, now);
        package.validate()?;
        metrics::compute_package_metrics(&mut package, &[], &[]);

        let saved = self.packages.insert(&package).await?;
        tracing::info!(
            "Created package {} ({}): {} leads, cost {:.2}",
            saved.name,
            saved.id,
            saved.total_leads,
            saved.total_cost
        );
        Ok(saved)
    }

    /// Apply edits, then re-derive the metrics from the package's calls
    pub async fn update(
        &self,
        id: i32,
        changes: LeadPackageChanges,
        now: DateTime<Utc>,
    ) -> Result<LeadPackage, DomainError> {
        if changes.is_empty() {
            return Err(DomainError::Validation("no package fields to update".into()));
        }

        let mut package = self.get(id).await?;
        package.apply(changes, now);
        package.validate()?;
        self.derive_metrics(&mut package).await?;

        let saved = self.packages.update(&package).await?;
        tracing::info!("Updated package {} ({})", saved.name, saved.id);
        Ok(saved)
    }

    /// Delete a package and everything recorded against it
    pub async fn delete(&self, id: i32) -> Result<(), DomainError> {
        self.packages.delete(id).await?;
        tracing::info!("Deleted package {}", id);
        Ok(())
    }

    /// Tasks scheduled against a package
    pub async fn tasks(&self, id: i32) -> Result<Vec<DialTask>, DomainError> {
        self.get(id).await?;
        self.tasks.find_by_package(id).await
    }

    /// Schedule a pending dial task against an existing package
    pub async fn create_task(
        &self,
        package_id: i32,
        draft: NewDialTask,
        now: DateTime<Utc>,
    ) -> Result<DialTask, DomainError> {
        self.get(package_id).await?;

        let task = DialTask::from_draft(package_id, draft, now);
        task.validate()?;

        let saved = self.tasks.insert(&task).await?;
        tracing::info!(
            "Created task {} ({}) for package {}",
            saved.task_name,
            saved.id,
            package_id
        );
        Ok(saved)
    }

    /// Recompute total cost and contact rate from the package's calls and save them
    pub async fn recompute(
        &self,
        id: i32,
        now: DateTime<Utc>,
    ) -> Result<(LeadPackage, PackageCallStats), DomainError> {
        let package = self.get(id).await?;
        self.recompute_package(package, now).await
    }

    /// Recompute every package; one failure aborts the run
    pub async fn recompute_all(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<(LeadPackage, PackageCallStats)>, DomainError> {
        let packages = self.packages.find_all().await?;
        let mut results = Vec::with_capacity(packages.len());

        for package in packages {
            results.push(self.recompute_package(package, now).await?);
        }

        tracing::info!("Recomputed metrics for {} packages", results.len());
        Ok(results)
    }

    async fn derive_metrics(
        &self,
        package: &mut LeadPackage,
    ) -> Result<PackageCallStats, DomainError> {
        let tasks = self.tasks.find_by_package(package.id).await?;
        let task_ids: Vec<i32> = tasks.iter().map(|t| t.id).collect();
        let calls = self.calls.find_by_tasks(&task_ids).await?;

        let stats = metrics::compute_package_metrics(package, &tasks, &calls);
        if !stats.has_call_data {
            tracing::warn!(
                package_id = package.id,
                contact_rate = package.contact_rate,
                "Package has no calls, contact rate not derived from call data"
            );
        }
        Ok(stats)
    }

    async fn recompute_package(
        &self,
        mut package: LeadPackage,
        now: DateTime<Utc>,
    ) -> Result<(LeadPackage, PackageCallStats), DomainError> {
        let stats = self.derive_metrics(&mut package).await?;
        package.updated_at = now;

        let saved = self.packages.save_metrics(&package).await?;
        tracing::info!(
            "Recomputed package {} ({}): {} calls, contact rate {:.4}",
            saved.name,
            saved.id,
            stats.total_calls,
            saved.contact_rate
        );

        Ok((saved, stats))
    }

    /// Task, call and tag breakdown for one package
    pub async fn stats(&self, id: i32) -> Result<PackageStats, DomainError> {
        let package = self.get(id).await?;
        let tasks = self.tasks.find_by_package(id).await?;
        let task_ids: Vec<i32> = tasks.iter().map(|t| t.id).collect();
        let calls = self.calls.find_by_tasks(&task_ids).await?;
        let tag_summaries = self.metrics.find_tag_summaries(id).await?;

        Ok(analytics::package_stats(package, &tasks, &calls, tag_summaries))
    }
}
