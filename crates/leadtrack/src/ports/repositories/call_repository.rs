//! Call Repository Port
//!
//! Dial attempts and their tags.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{errors::DomainError, Call, CallResult, CallTag, PageRequest};

/// Repository interface for Call and CallTag entities
#[async_trait]
pub trait CallRepository: Send + Sync {
    /// Calls of one task
    async fn find_by_task(&self, task_id: i32) -> Result<Vec<Call>, DomainError>;

    /// Calls of any of the given tasks
    async fn find_by_tasks(&self, task_ids: &[i32]) -> Result<Vec<Call>, DomainError>;

    /// Calls whose call_time falls on `date` (UTC)
    async fn find_on_date(&self, date: NaiveDate) -> Result<Vec<Call>, DomainError>;

    /// Tags attached to any of the given calls
    async fn find_tags_for_calls(&self, call_ids: &[i32]) -> Result<Vec<CallTag>, DomainError>;

    /// One page of a task's calls, newest first, optionally only one result,
    /// with the total number of matching rows
    async fn find_page_by_task(
        &self,
        task_id: i32,
        result: Option<CallResult>,
        page: &PageRequest,
    ) -> Result<(Vec<Call>, u64), DomainError>;

    /// Insert a call and its tags in one transaction.
    ///
    /// The tags' `call_id` is replaced by the id assigned to the call.
    async fn record_call(
        &self,
        call: &Call,
        tags: &[CallTag],
    ) -> Result<(Call, Vec<CallTag>), DomainError>;
}
