//! PostgreSQL implementation of MetricsRepository

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::PgPool;

use leadtrack::{DomainError, MetricsRepository, MetricsSummary, PackageTagSummary};

use super::write_error;

/// PostgreSQL implementation of MetricsRepository
pub struct PgMetricsRepository {
    pool: PgPool,
}

impl PgMetricsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct MetricsSummaryRow {
    id: i32,
    date: NaiveDate,
    total_packages: Option<i32>,
    new_packages: Option<i32>,
    total_leads: Option<i32>,
    total_calls: Option<i32>,
    connected_calls: Option<i32>,
    total_duration: Option<i32>,
    avg_contact_rate: Option<f64>,
    avg_interest_rate: Option<f64>,
    avg_call_duration: Option<i32>,
    total_cost: Option<f64>,
    total_revenue: Option<f64>,
    roi: Option<f64>,
    created_at: Option<NaiveDateTime>,
    updated_at: Option<NaiveDateTime>,
}

impl From<MetricsSummaryRow> for MetricsSummary {
    fn from(row: MetricsSummaryRow) -> Self {
        let created_at = row.created_at.unwrap_or_default().and_utc();
        Self {
            id: row.id,
            date: row.date,
            total_packages: row.total_packages.unwrap_or(0),
            new_packages: row.new_packages.unwrap_or(0),
            total_leads: i64::from(row.total_leads.unwrap_or(0)),
            total_calls: row.total_calls.unwrap_or(0),
            connected_calls: row.connected_calls.unwrap_or(0),
            total_duration: i64::from(row.total_duration.unwrap_or(0)),
            avg_contact_rate: row.avg_contact_rate.unwrap_or(0.0),
            avg_interest_rate: row.avg_interest_rate.unwrap_or(0.0),
            avg_call_duration: row.avg_call_duration.unwrap_or(0),
            total_cost: row.total_cost.unwrap_or(0.0),
            total_revenue: row.total_revenue.unwrap_or(0.0),
            roi: row.roi.unwrap_or(0.0),
            created_at,
            updated_at: row.updated_at.map_or(created_at, |t| t.and_utc()),
        }
    }
}

#[derive(sqlx::FromRow)]
struct PackageTagSummaryRow {
    id: i32,
    package_id: i32,
    tag_name: String,
    tag_value: Option<String>,
    tag_count: Option<i32>,
    percentage: Option<f64>,
    created_at: Option<NaiveDateTime>,
    updated_at: Option<NaiveDateTime>,
}

impl From<PackageTagSummaryRow> for PackageTagSummary {
    fn from(row: PackageTagSummaryRow) -> Self {
        let created_at = row.created_at.unwrap_or_default().and_utc();
        Self {
            id: row.id,
            package_id: row.package_id,
            tag_name: row.tag_name,
            tag_value: row.tag_value,
            tag_count: row.tag_count.unwrap_or(0),
            percentage: row.percentage.unwrap_or(0.0),
            created_at,
            updated_at: row.updated_at.map_or(created_at, |t| t.and_utc()),
        }
    }
}

/// The summary columns are `integer`
fn int_column(value: i64, column: &str) -> Result<i32, DomainError> {
    i32::try_from(value)
        .map_err(|_| DomainError::Validation(format!("{} out of range: {}", column, value)))
}

#[async_trait]
impl MetricsRepository for PgMetricsRepository {
    async fn find_summary(&self, date: NaiveDate) -> Result<Option<MetricsSummary>, DomainError> {
        let row = sqlx::query_as::<_, MetricsSummaryRow>(
            "SELECT * FROM metrics_summaries WHERE date = $1",
        )
        .bind(date)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(row.map(Into::into))
    }

    async fn find_summaries(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<MetricsSummary>, DomainError> {
        let rows = sqlx::query_as::<_, MetricsSummaryRow>(
            r#"
            SELECT * FROM metrics_summaries
            WHERE ($1::date IS NULL OR date >= $1)
              AND ($2::date IS NULL OR date <= $2)
            ORDER BY date DESC
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn upsert_summary(&self, summary: &MetricsSummary) -> Result<MetricsSummary, DomainError> {
        let row = sqlx::query_as::<_, MetricsSummaryRow>(
            r#"
            INSERT INTO metrics_summaries (
                date, total_packages, new_packages, total_leads,
                total_calls, connected_calls, total_duration,
                avg_contact_rate, avg_interest_rate, avg_call_duration,
                total_cost, total_revenue, roi, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            ON CONFLICT (date) DO UPDATE SET
                total_packages = EXCLUDED.total_packages,
                new_packages = EXCLUDED.new_packages,
                total_leads = EXCLUDED.total_leads,
                total_calls = EXCLUDED.total_calls,
                connected_calls = EXCLUDED.connected_calls,
                total_duration = EXCLUDED.total_duration,
                avg_contact_rate = EXCLUDED.avg_contact_rate,
                avg_interest_rate = EXCLUDED.avg_interest_rate,
                avg_call_duration = EXCLUDED.avg_call_duration,
                total_cost = EXCLUDED.total_cost,
                total_revenue = EXCLUDED.total_revenue,
                roi = EXCLUDED.roi,
                updated_at = EXCLUDED.updated_at
            RETURNING *
            "#,
        )
        .bind(summary.date)
        .bind(summary.total_packages)
        .bind(summary.new_packages)
        .bind(int_column(summary.total_leads, "total_leads")?)
        .bind(summary.total_calls)
        .bind(summary.connected_calls)
        .bind(int_column(summary.total_duration, "total_duration")?)
        .bind(summary.avg_contact_rate)
        .bind(summary.avg_interest_rate)
        .bind(summary.avg_call_duration)
        .bind(summary.total_cost)
        .bind(summary.total_revenue)
        .bind(summary.roi)
        .bind(summary.created_at.naive_utc())
        .bind(summary.updated_at.naive_utc())
        .fetch_one(&self.pool)
        .await
        .map_err(write_error)?;

        Ok(row.into())
    }

    async fn find_tag_summaries(
        &self,
        package_id: i32,
    ) -> Result<Vec<PackageTagSummary>, DomainError> {
        let rows = sqlx::query_as::<_, PackageTagSummaryRow>(
            r#"
            SELECT * FROM package_tag_summaries
            WHERE package_id = $1
            ORDER BY tag_name, tag_value NULLS FIRST
            "#,
        )
        .bind(package_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn replace_tag_summaries(
        &self,
        package_id: i32,
        rows: &[PackageTagSummary],
    ) -> Result<Vec<PackageTagSummary>, DomainError> {
        let mut tx = self.pool.begin().await.map_err(write_error)?;

        sqlx::query("DELETE FROM package_tag_summaries WHERE package_id = $1")
            .bind(package_id)
            .execute(&mut *tx)
            .await
            .map_err(write_error)?;

        let mut inserted = Vec::with_capacity(rows.len());
        for row in rows {
            let saved = sqlx::query_as::<_, PackageTagSummaryRow>(
                r#"
                INSERT INTO package_tag_summaries
                    (package_id, tag_name, tag_value, tag_count, percentage, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING *
                "#,
            )
            .bind(package_id)
            .bind(&row.tag_name)
            .bind(&row.tag_value)
            .bind(row.tag_count)
            .bind(row.percentage)
            .bind(row.created_at.naive_utc())
            .bind(row.updated_at.naive_utc())
            .fetch_one(&mut *tx)
            .await
            .map_err(write_error)?;

            inserted.push(saved.into());
        }

        tx.commit().await.map_err(write_error)?;

        Ok(inserted)
    }
}
