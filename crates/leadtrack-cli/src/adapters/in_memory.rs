//! In-memory repository implementation.
//!
//! Holds every table in process memory behind a single lock. Backs the
//! application service tests; nothing is persisted.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;

use leadtrack::{
    Call, CallRepository, CallResult, CallTag, DialTask, DomainError, LeadPackage,
    MetricsRepository, MetricsSummary, PackageFilter, PackageRepository, PackageTagSummary,
    PageRequest, TaskRepository,
};

#[derive(Default)]
struct Tables {
    packages: Vec<LeadPackage>,
    tasks: Vec<DialTask>,
    calls: Vec<Call>,
    tags: Vec<CallTag>,
    summaries: Vec<MetricsSummary>,
    tag_summaries: Vec<PackageTagSummary>,
    next_id: i32,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    /// Drop tasks and everything hanging off them, like the cascading foreign keys
    fn delete_tasks(&mut self, task_ids: &[i32]) {
        let call_ids: Vec<i32> = self
            .calls
            .iter()
            .filter(|c| task_ids.contains(&c.task_id))
            .map(|c| c.id)
            .collect();
        self.tags.retain(|t| !call_ids.contains(&t.call_id));
        self.calls.retain(|c| !task_ids.contains(&c.task_id));
        self.tasks.retain(|t| !task_ids.contains(&t.id));
    }
}

/// In-memory implementation of every repository port.
///
/// Rows inserted through the `insert_*` helpers get fresh ids, the way the
/// database sequences would assign them.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_package(&self, mut package: LeadPackage) -> LeadPackage {
        let mut tables = self.tables.write().await;
        package.id = tables.next_id();
        tables.packages.push(package.clone());
        package
    }

    pub async fn insert_task(&self, mut task: DialTask) -> DialTask {
        let mut tables = self.tables.write().await;
        task.id = tables.next_id();
        tables.tasks.push(task.clone());
        task
    }

    pub async fn insert_call(&self, mut call: Call) -> Call {
        let mut tables = self.tables.write().await;
        call.id = tables.next_id();
        tables.calls.push(call.clone());
        call
    }

    pub async fn insert_tag(&self, mut tag: CallTag) -> CallTag {
        let mut tables = self.tables.write().await;
        tag.id = tables.next_id();
        tables.tags.push(tag.clone());
        tag
    }

    pub async fn summary_count(&self) -> usize {
        self.tables.read().await.summaries.len()
    }

    pub async fn call_count(&self) -> usize {
        self.tables.read().await.calls.len()
    }

    pub async fn tag_count(&self) -> usize {
        self.tables.read().await.tags.len()
    }
}

fn newest_first(packages: &mut [LeadPackage]) {
    packages.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

#[async_trait]
impl PackageRepository for InMemoryStore {
    async fn find_by_id(&self, id: i32) -> Result<Option<LeadPackage>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.packages.iter().find(|p| p.id == id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<LeadPackage>, DomainError> {
        let mut packages = self.tables.read().await.packages.clone();
        newest_first(&mut packages);
        Ok(packages)
    }

    async fn find_page(
        &self,
        filter: &PackageFilter,
        page: &PageRequest,
    ) -> Result<(Vec<LeadPackage>, u64), DomainError> {
        let mut matching: Vec<LeadPackage> = self
            .tables
            .read()
            .await
            .packages
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        newest_first(&mut matching);

        let total = matching.len() as u64;
        let rows = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();

        Ok((rows, total))
    }

    async fn save_metrics(&self, package: &LeadPackage) -> Result<LeadPackage, DomainError> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .packages
            .iter_mut()
            .find(|p| p.id == package.id)
            .ok_or_else(|| DomainError::not_found("LeadPackage", package.id))?;

        stored.total_cost = package.total_cost;
        stored.contact_rate = package.contact_rate;
        stored.interest_rate = package.interest_rate;
        stored.updated_at = package.updated_at;

        Ok(stored.clone())
    }

    async fn insert(&self, package: &LeadPackage) -> Result<LeadPackage, DomainError> {
        let mut tables = self.tables.write().await;
        let mut inserted = package.clone();
        inserted.id = tables.next_id();
        tables.packages.push(inserted.clone());
        Ok(inserted)
    }

    async fn update(&self, package: &LeadPackage) -> Result<LeadPackage, DomainError> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .packages
            .iter_mut()
            .find(|p| p.id == package.id)
            .ok_or_else(|| DomainError::not_found("LeadPackage", package.id))?;

        let created_at = stored.created_at;
        *stored = package.clone();
        stored.created_at = created_at;
        Ok(stored.clone())
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        if !tables.packages.iter().any(|p| p.id == id) {
            return Err(DomainError::not_found("LeadPackage", id));
        }

        let task_ids: Vec<i32> = tables
            .tasks
            .iter()
            .filter(|t| t.package_id == id)
            .map(|t| t.id)
            .collect();
        tables.delete_tasks(&task_ids);
        tables.tag_summaries.retain(|s| s.package_id != id);
        tables.packages.retain(|p| p.id != id);
        Ok(())
    }
}

#[async_trait]
impl TaskRepository for InMemoryStore {
    async fn find_by_id(&self, id: i32) -> Result<Option<DialTask>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.tasks.iter().find(|t| t.id == id).cloned())
    }

    async fn find_by_package(&self, package_id: i32) -> Result<Vec<DialTask>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .iter()
            .filter(|t| t.package_id == package_id)
            .cloned()
            .collect())
    }

    async fn find_all(&self) -> Result<Vec<DialTask>, DomainError> {
        Ok(self.tables.read().await.tasks.clone())
    }

    async fn save_metrics(&self, task: &DialTask) -> Result<DialTask, DomainError> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .tasks
            .iter_mut()
            .find(|t| t.id == task.id)
            .ok_or_else(|| DomainError::not_found("DialTask", task.id))?;

        stored.total_calls = task.total_calls;
        stored.connected_calls = task.connected_calls;
        stored.interested_calls = task.interested_calls;
        stored.updated_at = task.updated_at;

        Ok(stored.clone())
    }

    async fn insert(&self, task: &DialTask) -> Result<DialTask, DomainError> {
        let mut tables = self.tables.write().await;
        if !tables.packages.iter().any(|p| p.id == task.package_id) {
            return Err(DomainError::Conflict(format!(
                "dial_tasks.package_id {} references no lead package",
                task.package_id
            )));
        }

        let mut inserted = task.clone();
        inserted.id = tables.next_id();
        tables.tasks.push(inserted.clone());
        Ok(inserted)
    }

    async fn update(&self, task: &DialTask) -> Result<DialTask, DomainError> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .tasks
            .iter_mut()
            .find(|t| t.id == task.id)
            .ok_or_else(|| DomainError::not_found("DialTask", task.id))?;

        stored.task_name = task.task_name.clone();
        stored.description = task.description.clone();
        stored.start_time = task.start_time;
        stored.end_time = task.end_time;
        stored.status = task.status;
        stored.updated_at = task.updated_at;
        Ok(stored.clone())
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        if !tables.tasks.iter().any(|t| t.id == id) {
            return Err(DomainError::not_found("DialTask", id));
        }
        tables.delete_tasks(&[id]);
        Ok(())
    }
}

#[async_trait]
impl CallRepository for InMemoryStore {
    async fn find_by_task(&self, task_id: i32) -> Result<Vec<Call>, DomainError> {
        self.find_by_tasks(&[task_id]).await
    }

    async fn find_by_tasks(&self, task_ids: &[i32]) -> Result<Vec<Call>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables
            .calls
            .iter()
            .filter(|c| task_ids.contains(&c.task_id))
            .cloned()
            .collect())
    }

    async fn find_on_date(&self, date: NaiveDate) -> Result<Vec<Call>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables
            .calls
            .iter()
            .filter(|c| c.call_date() == date)
            .cloned()
            .collect())
    }

    async fn find_tags_for_calls(&self, call_ids: &[i32]) -> Result<Vec<CallTag>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables
            .tags
            .iter()
            .filter(|t| call_ids.contains(&t.call_id))
            .cloned()
            .collect())
    }

    async fn find_page_by_task(
        &self,
        task_id: i32,
        result: Option<CallResult>,
        page: &PageRequest,
    ) -> Result<(Vec<Call>, u64), DomainError> {
        let mut matching: Vec<Call> = self
            .tables
            .read()
            .await
            .calls
            .iter()
            .filter(|c| c.task_id == task_id)
            .filter(|c| result.map_or(true, |r| c.result == r))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.call_time.cmp(&a.call_time).then(b.id.cmp(&a.id)));

        let total = matching.len() as u64;
        let rows = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();

        Ok((rows, total))
    }

    async fn record_call(
        &self,
        call: &Call,
        tags: &[CallTag],
    ) -> Result<(Call, Vec<CallTag>), DomainError> {
        let mut tables = self.tables.write().await;
        if !tables.tasks.iter().any(|t| t.id == call.task_id) {
            return Err(DomainError::Conflict(format!(
                "calls.task_id {} references no dial task",
                call.task_id
            )));
        }

        let mut saved = call.clone();
        saved.id = tables.next_id();
        tables.calls.push(saved.clone());

        let mut saved_tags = Vec::with_capacity(tags.len());
        for tag in tags {
            let mut tag = tag.clone();
            tag.id = tables.next_id();
            tag.call_id = saved.id;
            tables.tags.push(tag.clone());
            saved_tags.push(tag);
        }

        Ok((saved, saved_tags))
    }
}

#[async_trait]
impl MetricsRepository for InMemoryStore {
    async fn find_summary(&self, date: NaiveDate) -> Result<Option<MetricsSummary>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.summaries.iter().find(|s| s.date == date).cloned())
    }

    async fn find_summaries(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<MetricsSummary>, DomainError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<MetricsSummary> = tables
            .summaries
            .iter()
            .filter(|s| start.map_or(true, |d| s.date >= d))
            .filter(|s| end.map_or(true, |d| s.date <= d))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(rows)
    }

    async fn upsert_summary(&self, summary: &MetricsSummary) -> Result<MetricsSummary, DomainError> {
        let mut tables = self.tables.write().await;

        if let Some(stored) = tables.summaries.iter_mut().find(|s| s.date == summary.date) {
            let (id, created_at) = (stored.id, stored.created_at);
            *stored = summary.clone();
            stored.id = id;
            stored.created_at = created_at;
            return Ok(stored.clone());
        }

        let mut inserted = summary.clone();
        inserted.id = tables.next_id();
        tables.summaries.push(inserted.clone());
        Ok(inserted)
    }

    async fn find_tag_summaries(
        &self,
        package_id: i32,
    ) -> Result<Vec<PackageTagSummary>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables
            .tag_summaries
            .iter()
            .filter(|s| s.package_id == package_id)
            .cloned()
            .collect())
    }

    async fn replace_tag_summaries(
        &self,
        package_id: i32,
        rows: &[PackageTagSummary],
    ) -> Result<Vec<PackageTagSummary>, DomainError> {
        let mut tables = self.tables.write().await;
        tables.tag_summaries.retain(|s| s.package_id != package_id);

        let mut inserted = Vec::with_capacity(rows.len());
        for row in rows {
            let mut row = row.clone();
            row.id = tables.next_id();
            row.package_id = package_id;
            tables.tag_summaries.push(row.clone());
            inserted.push(row);
        }

        Ok(inserted)
    }
}
