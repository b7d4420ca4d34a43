//! PostgreSQL Repository Implementations
//!
//! Timestamp columns are `timestamp without time zone` holding UTC.

mod call_repository;
mod metrics_repository;
mod package_repository;
mod task_repository;

pub use call_repository::PgCallRepository;
pub use metrics_repository::PgMetricsRepository;
pub use package_repository::PgPackageRepository;
pub use task_repository::PgTaskRepository;

use leadtrack::DomainError;
use sqlx::error::ErrorKind;

/// Map a failed write, turning constraint violations into domain errors
pub(crate) fn write_error(err: sqlx::Error) -> DomainError {
    match &err {
        sqlx::Error::Database(db_err) => constraint_error(db_err.kind(), db_err.message()),
        _ => DomainError::Repository(err.to_string()),
    }
}

fn constraint_error(kind: ErrorKind, message: &str) -> DomainError {
    match kind {
        ErrorKind::UniqueViolation | ErrorKind::ForeignKeyViolation => {
            DomainError::Conflict(message.to_string())
        }
        ErrorKind::NotNullViolation | ErrorKind::CheckViolation => {
            DomainError::Validation(message.to_string())
        }
        _ => DomainError::Repository(message.to_string()),
    }
}
