//! PostgreSQL implementation of TaskRepository

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::PgPool;

use leadtrack::{DialTask, DomainError, TaskRepository, TaskStatus};

use super::write_error;

/// PostgreSQL implementation of TaskRepository
pub struct PgTaskRepository {
    pool: PgPool,
}

impl PgTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct DialTaskRow {
    id: i32,
    package_id: i32,
    task_name: String,
    description: Option<String>,
    start_time: Option<NaiveDateTime>,
    end_time: Option<NaiveDateTime>,
    status: Option<String>,
    total_calls: Option<i32>,
    connected_calls: Option<i32>,
    interested_calls: Option<i32>,
    created_at: Option<NaiveDateTime>,
    updated_at: Option<NaiveDateTime>,
}

impl TryFrom<DialTaskRow> for DialTask {
    type Error = DomainError;

    fn try_from(row: DialTaskRow) -> Result<Self, Self::Error> {
        let created_at = row.created_at.unwrap_or_default().and_utc();
        Ok(Self {
            id: row.id,
            package_id: row.package_id,
            task_name: row.task_name,
            description: row.description,
            start_time: row.start_time.map(|t| t.and_utc()),
            end_time: row.end_time.map(|t| t.and_utc()),
            status: row
                .status
                .as_deref()
                .map(str::parse::<TaskStatus>)
                .transpose()?
                .unwrap_or_default(),
            total_calls: row.total_calls.unwrap_or(0),
            connected_calls: row.connected_calls.unwrap_or(0),
            interested_calls: row.interested_calls.unwrap_or(0),
            created_at,
            updated_at: row.updated_at.map_or(created_at, |t| t.and_utc()),
        })
    }
}

fn into_tasks(rows: Vec<DialTaskRow>) -> Result<Vec<DialTask>, DomainError> {
    rows.into_iter().map(TryInto::try_into).collect()
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<DialTask>, DomainError> {
        let row = sqlx::query_as::<_, DialTaskRow>("SELECT * FROM dial_tasks WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::Repository(e.to_string()))?;

        row.map(TryInto::try_into).transpose()
    }

    async fn find_by_package(&self, package_id: i32) -> Result<Vec<DialTask>, DomainError> {
        let rows = sqlx::query_as::<_, DialTaskRow>(
            "SELECT * FROM dial_tasks WHERE package_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(package_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        into_tasks(rows)
    }

    async fn find_all(&self) -> Result<Vec<DialTask>, DomainError> {
        let rows = sqlx::query_as::<_, DialTaskRow>(
            "SELECT * FROM dial_tasks ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        into_tasks(rows)
    }

    async fn save_metrics(&self, task: &DialTask) -> Result<DialTask, DomainError> {
        let row = sqlx::query_as::<_, DialTaskRow>(
            r#"
            UPDATE dial_tasks
            SET total_calls = $2, connected_calls = $3, interested_calls = $4, updated_at = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(task.id)
        .bind(task.total_calls)
        .bind(task.connected_calls)
        .bind(task.interested_calls)
        .bind(task.updated_at.naive_utc())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?
        .ok_or_else(|| DomainError::not_found("DialTask", task.id))?;

        row.try_into()
    }

    async fn insert(&self, task: &DialTask) -> Result<DialTask, DomainError> {
        let row = sqlx::query_as::<_, DialTaskRow>(
            r#"
            INSERT INTO dial_tasks (
                package_id, task_name, description, start_time, end_time, status,
                total_calls, connected_calls, interested_calls, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(task.package_id)
        .bind(&task.task_name)
        .bind(&task.description)
        .bind(task.start_time.map(|t| t.naive_utc()))
        .bind(task.end_time.map(|t| t.naive_utc()))
        .bind(task.status.to_string())
        .bind(task.total_calls)
        .bind(task.connected_calls)
        .bind(task.interested_calls)
        .bind(task.created_at.naive_utc())
        .bind(task.updated_at.naive_utc())
        .fetch_one(&self.pool)
        .await
        .map_err(write_error)?;

        row.try_into()
    }

    async fn update(&self, task: &DialTask) -> Result<DialTask, DomainError> {
        let row = sqlx::query_as::<_, DialTaskRow>(
            r#"
            UPDATE dial_tasks
            SET task_name = $2, description = $3, start_time = $4, end_time = $5,
                status = $6, updated_at = $7
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(task.id)
        .bind(&task.task_name)
        .bind(&task.description)
        .bind(task.start_time.map(|t| t.naive_utc()))
        .bind(task.end_time.map(|t| t.naive_utc()))
        .bind(task.status.to_string())
        .bind(task.updated_at.naive_utc())
        .fetch_optional(&self.pool)
        .await
        .map_err(write_error)?
        .ok_or_else(|| DomainError::not_found("DialTask", task.id))?;

        row.try_into()
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM dial_tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(write_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("DialTask", id));
        }
        Ok(())
    }
}
