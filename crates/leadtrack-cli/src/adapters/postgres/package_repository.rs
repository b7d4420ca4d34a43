//! PostgreSQL implementation of PackageRepository

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::PgPool;

use leadtrack::{DomainError, LeadPackage, PackageFilter, PackageRepository, PageRequest};

use super::write_error;

/// PostgreSQL implementation of PackageRepository
pub struct PgPackageRepository {
    pool: PgPool,
}

impl PgPackageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Internal row type for sqlx mapping
#[derive(sqlx::FromRow)]
struct LeadPackageRow {
    id: i32,
    name: String,
    source: String,
    industry: Option<String>,
    region: Option<String>,
    total_leads: Option<i32>,
    valid_leads: Option<i32>,
    contact_rate: Option<f64>,
    interest_rate: Option<f64>,
    cost_per_lead: Option<f64>,
    total_cost: Option<f64>,
    created_at: Option<NaiveDateTime>,
    updated_at: Option<NaiveDateTime>,
}

impl From<LeadPackageRow> for LeadPackage {
    fn from(row: LeadPackageRow) -> Self {
        let created_at = row.created_at.unwrap_or_default().and_utc();
        Self {
            id: row.id,
            name: row.name,
            source: row.source,
            industry: row.industry,
            region: row.region,
            total_leads: row.total_leads.unwrap_or(0),
            valid_leads: row.valid_leads.unwrap_or(0),
            contact_rate: row.contact_rate.unwrap_or(0.0),
            interest_rate: row.interest_rate.unwrap_or(0.0),
            cost_per_lead: row.cost_per_lead.unwrap_or(0.0),
            total_cost: row.total_cost.unwrap_or(0.0),
            created_at,
            updated_at: row.updated_at.map_or(created_at, |t| t.and_utc()),
        }
    }
}

const FILTER: &str = r#"
    ($1::text IS NULL OR source = $1)
    AND ($2::text IS NULL OR industry = $2)
    AND ($3::text IS NULL OR region = $3)
"#;

#[async_trait]
impl PackageRepository for PgPackageRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<LeadPackage>, DomainError> {
        let row =
            sqlx::query_as::<_, LeadPackageRow>("SELECT * FROM lead_packages WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(row.map(Into::into))
    }

    async fn find_all(&self) -> Result<Vec<LeadPackage>, DomainError> {
        let rows = sqlx::query_as::<_, LeadPackageRow>(
            "SELECT * FROM lead_packages ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_page(
        &self,
        filter: &PackageFilter,
        page: &PageRequest,
    ) -> Result<(Vec<LeadPackage>, u64), DomainError> {
        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM lead_packages WHERE {}",
            FILTER
        ))
        .bind(&filter.source)
        .bind(&filter.industry)
        .bind(&filter.region)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        let rows = sqlx::query_as::<_, LeadPackageRow>(&format!(
            r#"
            SELECT * FROM lead_packages
            WHERE {}
            ORDER BY created_at DESC, id DESC
            LIMIT $4 OFFSET $5
            "#,
            FILTER
        ))
        .bind(&filter.source)
        .bind(&filter.industry)
        .bind(&filter.region)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok((
            rows.into_iter().map(Into::into).collect(),
            total.max(0) as u64,
        ))
    }

    async fn save_metrics(&self, package: &LeadPackage) -> Result<LeadPackage, DomainError> {
        let row = sqlx::query_as::<_, LeadPackageRow>(
            r#"
            UPDATE lead_packages
            SET total_cost = $2, contact_rate = $3, interest_rate = $4, updated_at = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(package.id)
        .bind(package.total_cost)
        .bind(package.contact_rate)
        .bind(package.interest_rate)
        .bind(package.updated_at.naive_utc())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?
        .ok_or_else(|| DomainError::not_found("LeadPackage", package.id))?;

        Ok(row.into())
    }

    async fn insert(&self, package: &LeadPackage) -> Result<LeadPackage, DomainError> {
        let row = sqlx::query_as::<_, LeadPackageRow>(
            r#"
            INSERT INTO lead_packages (
                name, source, industry, region, total_leads, valid_leads,
                contact_rate, interest_rate, cost_per_lead, total_cost,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(&package.name)
        .bind(&package.source)
        .bind(&package.industry)
        .bind(&package.region)
        .bind(package.total_leads)
        .bind(package.valid_leads)
        .bind(package.contact_rate)
        .bind(package.interest_rate)
        .bind(package.cost_per_lead)
        .bind(package.total_cost)
        .bind(package.created_at.naive_utc())
        .bind(package.updated_at.naive_utc())
        .fetch_one(&self.pool)
        .await
        .map_err(write_error)?;

        Ok(row.into())
    }

    async fn update(&self, package: &LeadPackage) -> Result<LeadPackage, DomainError> {
        let row = sqlx::query_as::<_, LeadPackageRow>(
            r#"
            UPDATE lead_packages
            SET name = $2, source = $3, industry = $4, region = $5,
                total_leads = $6, valid_leads = $7, contact_rate = $8,
                interest_rate = $9, cost_per_lead = $10, total_cost = $11,
                updated_at = $12
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(package.id)
        .bind(&package.name)
        .bind(&package.source)
        .bind(&package.industry)
        .bind(&package.region)
        .bind(package.total_leads)
        .bind(package.valid_leads)
        .bind(package.contact_rate)
        .bind(package.interest_rate)
        .bind(package.cost_per_lead)
        .bind(package.total_cost)
        .bind(package.updated_at.naive_utc())
        .fetch_optional(&self.pool)
        .await
        .map_err(write_error)?
        .ok_or_else(|| DomainError::not_found("LeadPackage", package.id))?;

        Ok(row.into())
    }

    /// Dependent rows go with it through the `ON DELETE CASCADE` foreign keys
    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM lead_packages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(write_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("LeadPackage", id));
        }
        Ok(())
    }
}
