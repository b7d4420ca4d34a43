//! Dial Task Repository Port

use async_trait::async_trait;

use crate::domain::{errors::DomainError, DialTask};

/// Repository interface for DialTask entities
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Find a task by ID
    async fn find_by_id(&self, id: i32) -> Result<Option<DialTask>, DomainError>;

    /// Find all tasks of a package
    async fn find_by_package(&self, package_id: i32) -> Result<Vec<DialTask>, DomainError>;

    /// Find all tasks
    async fn find_all(&self) -> Result<Vec<DialTask>, DomainError>;

    /// Write back the call counters and updated_at
    async fn save_metrics(&self, task: &DialTask) -> Result<DialTask, DomainError>;

    /// Insert a new task. Fails with `Conflict` if its package does not exist
    async fn insert(&self, task: &DialTask) -> Result<DialTask, DomainError>;

    /// Overwrite the editable columns (name, description, status, schedule)
    async fn update(&self, task: &DialTask) -> Result<DialTask, DomainError>;

    /// Delete a task together with its calls and their tags
    async fn delete(&self, id: i32) -> Result<(), DomainError>;
}
