//! PostgreSQL implementation of CallRepository

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::PgPool;

use leadtrack::{Call, CallRepository, CallResult, CallTag, DomainError, PageRequest, TagType};

use super::write_error;

/// PostgreSQL implementation of CallRepository
pub struct PgCallRepository {
    pool: PgPool,
}

impl PgCallRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CallRow {
    id: i32,
    task_id: i32,
    phone_number: String,
    call_time: Option<NaiveDateTime>,
    duration: Option<i32>,
    result: Option<String>,
    notes: Option<String>,
    customer_name: Option<String>,
    company: Option<String>,
    created_at: Option<NaiveDateTime>,
    updated_at: Option<NaiveDateTime>,
}

impl TryFrom<CallRow> for Call {
    type Error = DomainError;

    fn try_from(row: CallRow) -> Result<Self, Self::Error> {
        let call_time = row.call_time.or(row.created_at).unwrap_or_default().and_utc();
        let created_at = row.created_at.map_or(call_time, |t| t.and_utc());
        Ok(Self {
            id: row.id,
            task_id: row.task_id,
            phone_number: row.phone_number,
            call_time,
            duration: row.duration.unwrap_or(0),
            result: row
                .result
                .as_deref()
                .map(str::parse::<CallResult>)
                .transpose()?
                .unwrap_or_default(),
            notes: row.notes,
            customer_name: row.customer_name,
            company: row.company,
            created_at,
            updated_at: row.updated_at.map_or(created_at, |t| t.and_utc()),
        })
    }
}

#[derive(sqlx::FromRow)]
struct CallTagRow {
    id: i32,
    call_id: i32,
    tag_name: String,
    tag_value: Option<String>,
    tag_type: Option<String>,
    created_at: Option<NaiveDateTime>,
}

impl TryFrom<CallTagRow> for CallTag {
    type Error = DomainError;

    fn try_from(row: CallTagRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            call_id: row.call_id,
            tag_name: row.tag_name,
            tag_value: row.tag_value,
            tag_type: row
                .tag_type
                .as_deref()
                .map(str::parse::<TagType>)
                .transpose()?
                .unwrap_or_default(),
            created_at: row.created_at.unwrap_or_default().and_utc(),
        })
    }
}

fn into_calls(rows: Vec<CallRow>) -> Result<Vec<Call>, DomainError> {
    rows.into_iter().map(TryInto::try_into).collect()
}

#[async_trait]
impl CallRepository for PgCallRepository {
    async fn find_by_task(&self, task_id: i32) -> Result<Vec<Call>, DomainError> {
        let rows = sqlx::query_as::<_, CallRow>(
            "SELECT * FROM calls WHERE task_id = $1 ORDER BY call_time, id",
        )
        .bind(task_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        into_calls(rows)
    }

    async fn find_by_tasks(&self, task_ids: &[i32]) -> Result<Vec<Call>, DomainError> {
        if task_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, CallRow>(
            "SELECT * FROM calls WHERE task_id = ANY($1) ORDER BY call_time, id",
        )
        .bind(task_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        into_calls(rows)
    }

    async fn find_on_date(&self, date: NaiveDate) -> Result<Vec<Call>, DomainError> {
        let start = date.and_time(NaiveTime::MIN);
        let end = start + Duration::days(1);

        let rows = sqlx::query_as::<_, CallRow>(
            "SELECT * FROM calls WHERE call_time >= $1 AND call_time < $2 ORDER BY call_time, id",
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        into_calls(rows)
    }

    async fn find_tags_for_calls(&self, call_ids: &[i32]) -> Result<Vec<CallTag>, DomainError> {
        if call_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, CallTagRow>(
            "SELECT * FROM call_tags WHERE call_id = ANY($1) ORDER BY id",
        )
        .bind(call_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn find_page_by_task(
        &self,
        task_id: i32,
        result: Option<CallResult>,
        page: &PageRequest,
    ) -> Result<(Vec<Call>, u64), DomainError> {
        let result = result.map(|r| r.to_string());

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM calls WHERE task_id = $1 AND ($2::text IS NULL OR result = $2)",
        )
        .bind(task_id)
        .bind(&result)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        let rows = sqlx::query_as::<_, CallRow>(
            r#"
            SELECT * FROM calls
            WHERE task_id = $1 AND ($2::text IS NULL OR result = $2)
            ORDER BY call_time DESC, id DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(task_id)
        .bind(&result)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok((into_calls(rows)?, total.max(0) as u64))
    }

    async fn record_call(
        &self,
        call: &Call,
        tags: &[CallTag],
    ) -> Result<(Call, Vec<CallTag>), DomainError> {
        let mut tx = self.pool.begin().await.map_err(write_error)?;

        let saved: Call = sqlx::query_as::<_, CallRow>(
            r#"
            INSERT INTO calls (
                task_id, phone_number, call_time, duration, result,
                notes, customer_name, company, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(call.task_id)
        .bind(&call.phone_number)
        .bind(call.call_time.naive_utc())
        .bind(call.duration)
        .bind(call.result.to_string())
        .bind(&call.notes)
        .bind(&call.customer_name)
        .bind(&call.company)
        .bind(call.created_at.naive_utc())
        .bind(call.updated_at.naive_utc())
        .fetch_one(&mut *tx)
        .await
        .map_err(write_error)?
        .try_into()?;

        let mut saved_tags = Vec::with_capacity(tags.len());
        for tag in tags {
            let row = sqlx::query_as::<_, CallTagRow>(
                r#"
                INSERT INTO call_tags (call_id, tag_name, tag_value, tag_type, created_at)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING *
                "#,
            )
            .bind(saved.id)
            .bind(&tag.tag_name)
            .bind(&tag.tag_value)
            .bind(tag.tag_type.to_string())
            .bind(tag.created_at.naive_utc())
            .fetch_one(&mut *tx)
            .await
            .map_err(write_error)?;

            saved_tags.push(row.try_into()?);
        }

        tx.commit().await.map_err(write_error)?;

        Ok((saved, saved_tags))
    }
}
