//! Metrics Application Service (Use Case)
//!
//! Daily summaries, trend series, tag summaries and the dashboard overview.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};

use leadtrack::analytics::{self, DashboardOverview};
use leadtrack::metrics;
use leadtrack::{
    CallRepository, DateRange, DomainError, MetricsRepository, MetricsSummary, PackageRepository,
    PackageTagSummary, TaskRepository, TrendPoint,
};

/// Application service for derived metric rows
pub struct MetricsService<P, T, C, M>
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

impl<P, T, C, M> MetricsService<P, T, C, M>
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

    /// Compute and upsert the summary row for `date`
    pub async fn compute_daily(
        &self,
        date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<MetricsSummary, DomainError> {
        let packages = self.packages.find_all().await?;
        let calls = self.calls.find_on_date(date).await?;
        let existing = self.metrics.find_summary(date).await?;
        let is_update = existing.is_some();

        let summary = metrics::compute_daily_summary(date, &packages, &calls, existing, now);
        let saved = self.metrics.upsert_summary(&summary).await?;

        tracing::info!(
            "{} daily summary for {}: {} calls, {} connected",
            if is_update { "Updated" } else { "Created" },
            saved.date,
            saved.total_calls,
            saved.connected_calls
        );

        Ok(saved)
    }

    /// Stored summaries, newest first
    pub async fn list_summaries(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<MetricsSummary>, DomainError> {
        if let (Some(start), Some(end)) = (start, end) {
            DateRange::new(start, end)?;
        }
        self.metrics.find_summaries(start, end).await
    }

    /// One point per day of `range`, zero placeholders for days without a summary
    pub async fn trends(&self, range: DateRange) -> Result<Vec<TrendPoint>, DomainError> {
        let summaries = self
            .metrics
            .find_summaries(Some(range.start), Some(range.end))
            .await?;
        tracing::debug!(
            days = range.days(),
            summaries = summaries.len(),
            "Building trend series"
        );

        Ok(metrics::compute_trend_series(&range, &summaries))
    }

    /// Rebuild the tag distribution of one package
    pub async fn recompute_tag_summaries(
        &self,
        package_id: i32,
        now: DateTime<Utc>,
    ) -> Result<Vec<PackageTagSummary>, DomainError> {
        if self.packages.find_by_id(package_id).await?.is_none() {
            return Err(DomainError::not_found("LeadPackage", package_id));
        }

        let tasks = self.tasks.find_by_package(package_id).await?;
        let task_ids: Vec<i32> = tasks.iter().map(|t| t.id).collect();
        let calls = self.calls.find_by_tasks(&task_ids).await?;
        let call_ids: Vec<i32> = calls.iter().map(|c| c.id).collect();
        let tags = self.calls.find_tags_for_calls(&call_ids).await?;

        let rows = metrics::compute_tag_summary(package_id, &tags, now);
        let saved = self.metrics.replace_tag_summaries(package_id, &rows).await?;

        tracing::info!(
            "Rebuilt {} tag summaries for package {} from {} tags",
            saved.len(),
            package_id,
            tags.len()
        );

        Ok(saved)
    }

    /// Rebuild tag distributions for every package, returning (package id, rows written)
    pub async fn recompute_all_tag_summaries(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<(i32, usize)>, DomainError> {
        let packages = self.packages.find_all().await?;
        let mut written = Vec::with_capacity(packages.len());

        for package in packages {
            let rows = self.recompute_tag_summaries(package.id, now).await?;
            written.push((package.id, rows.len()));
        }

        Ok(written)
    }

    pub async fn dashboard(
        &self,
        today: NaiveDate,
        recent_limit: usize,
    ) -> Result<DashboardOverview, DomainError> {
        let packages = self.packages.find_all().await?;
        let calls = self.calls.find_on_date(today).await?;

        Ok(analytics::dashboard_overview(&packages, &calls, today, recent_limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryStore;
    use chrono::TimeZone;
    use leadtrack::{Call, CallResult, CallTag, DialTask, LeadPackage, NewLeadPackage, TagType};

    type Service = MetricsService<InMemoryStore, InMemoryStore, InMemoryStore, InMemoryStore>;

    fn service(store: &InMemoryStore) -> Service {
        let store = Arc::new(store.clone());
        MetricsService::new(store.clone(), store.clone(), store.clone(), store)
    }

    fn at(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, d, h, 0, 0).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, d).unwrap()
    }

    async fn seed(store: &InMemoryStore) -> (LeadPackage, DialTask) {
        let mut package = LeadPackage::new(
            NewLeadPackage {
                name: "October".into(),
                source: "vendor".into(),
                industry: None,
                region: None,
                total_leads: 100,
                valid_leads: 80,
                cost_per_lead: 1.5,
            },
            at(18, 8),
        );
        package.total_cost = 150.0;
        let package = store.insert_package(package).await;
        let task = store.insert_task(DialTask::new(package.id, "t".into(), at(18, 8))).await;
        (package, task)
    }

    async fn tag(store: &InMemoryStore, call_id: i32, value: &str) {
        store
            .insert_tag(CallTag::new(
                call_id,
                "interest_level".into(),
                Some(value.into()),
                TagType::InterestLevel,
                at(18, 9),
            ))
            .await;
    }

    #[tokio::test]
    async fn test_compute_daily_upserts_one_row() {
        let store = InMemoryStore::new();
        let (_, task) = seed(&store).await;
        store
            .insert_call(Call::new(task.id, "1".into(), at(18, 9), 120, CallResult::Connected))
            .await;
        store
            .insert_call(Call::new(task.id, "2".into(), at(18, 10), 0, CallResult::Busy))
            .await;
        store
            .insert_call(Call::new(task.id, "3".into(), at(17, 10), 60, CallResult::Connected))
            .await;
        let svc = service(&store);

        let first = svc.compute_daily(day(18), at(18, 20)).await.unwrap();
        let second = svc.compute_daily(day(18), at(18, 21)).await.unwrap();

        assert_eq!(store.summary_count().await, 1);
        assert_eq!(first.id, second.id);
        assert_eq!(second.created_at, at(18, 20));
        assert_eq!(second.updated_at, at(18, 21));
        assert_eq!(second.total_calls, 2);
        assert_eq!(second.connected_calls, 1);
        assert_eq!(second.avg_contact_rate, 0.5);
        assert_eq!(second.avg_call_duration, 120);
        assert_eq!(second.new_packages, 1);
        assert_eq!(second.total_cost, 150.0);
    }

    #[tokio::test]
    async fn test_trends_fill_missing_days() {
        let store = InMemoryStore::new();
        let (_, task) = seed(&store).await;
        store
            .insert_call(Call::new(task.id, "1".into(), at(16, 9), 30, CallResult::Connected))
            .await;
        let svc = service(&store);
        svc.compute_daily(day(16), at(16, 23)).await.unwrap();

        let range = DateRange::last_n_days(day(18), 7).unwrap();
        let points = svc.trends(range).await.unwrap();

        assert_eq!(points.len(), 7);
        assert_eq!(points[0].date, day(12));
        assert_eq!(points[6].date, day(18));
        assert_eq!(points.iter().filter(|p| !p.is_placeholder).count(), 1);
        assert_eq!(points[4].total_calls, 1);
    }

    #[tokio::test]
    async fn test_list_summaries_rejects_inverted_range() {
        let store = InMemoryStore::new();
        let err = service(&store)
            .list_summaries(Some(day(18)), Some(day(1)))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn test_recompute_tag_summaries_replaces_rows() {
        let store = InMemoryStore::new();
        let (package, task) = seed(&store).await;
        let a = store
            .insert_call(Call::new(task.id, "1".into(), at(18, 9), 30, CallResult::Connected))
            .await;
        let b = store
            .insert_call(Call::new(task.id, "2".into(), at(18, 9), 30, CallResult::Connected))
            .await;
        tag(&store, a.id, "high").await;
        tag(&store, b.id, "low").await;
        let svc = service(&store);

        svc.recompute_tag_summaries(package.id, at(18, 20)).await.unwrap();
        let c = store
            .insert_call(Call::new(task.id, "3".into(), at(18, 9), 30, CallResult::Connected))
            .await;
        tag(&store, c.id, "high").await;
        let rows = svc.recompute_tag_summaries(package.id, at(18, 21)).await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(store.find_tag_summaries(package.id).await.unwrap(), rows);
        let high = rows.iter().find(|r| r.tag_value.as_deref() == Some("high")).unwrap();
        assert_eq!(high.tag_count, 2);
        let total: f64 = rows.iter().map(|r| r.percentage).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_recompute_all_tag_summaries() {
        let store = InMemoryStore::new();
        let (package, _) = seed(&store).await;

        let written = service(&store).recompute_all_tag_summaries(at(18, 20)).await.unwrap();

        assert_eq!(written, vec![(package.id, 0)]);
    }

    #[tokio::test]
    async fn test_tag_summaries_for_missing_package() {
        let store = InMemoryStore::new();
        let err = service(&store)
            .recompute_tag_summaries(99, at(18, 20))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_dashboard() {
        let store = InMemoryStore::new();
        let (_, task) = seed(&store).await;
        store
            .insert_call(Call::new(task.id, "1".into(), at(18, 9), 30, CallResult::Connected))
            .await;
        store
            .insert_call(Call::new(task.id, "2".into(), at(17, 9), 30, CallResult::Connected))
            .await;

        let overview = service(&store).dashboard(day(18), 10).await.unwrap();

        assert_eq!(overview.summary.total_packages, 1);
        assert_eq!(overview.summary.total_leads, 100);
        assert_eq!(overview.summary.today_calls, 1);
        assert_eq!(overview.summary.today_connected, 1);
    }
}
