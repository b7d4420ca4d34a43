//! Dial Task Application Service (Use Case)
//!
//! Task edits, call recording and call counters.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use leadtrack::metrics;
use leadtrack::{
    Call, CallRepository, CallResult, CallTag, DialTask, DialTaskChanges, DomainError,
    InterestPolicy, NewCall, NewCallTag, PageRequest, Pagination, TaskRepository,
};

/// A stored call, its tags and the task counters after recording it
#[derive(Debug, Clone, Serialize)]
pub struct RecordedCall {
    pub call: Call,
    pub tags: Vec<CallTag>,
    pub task: DialTask,
}

/// Application service for dial task operations
pub struct TaskService<T: TaskRepository, C: CallRepository> {
    tasks: Arc<T>,
    calls: Arc<C>,
    policy: InterestPolicy,
}

impl<T: TaskRepository, C: CallRepository> TaskService<T, C> {
    pub fn new(tasks: Arc<T>, calls: Arc<C>, policy: InterestPolicy) -> Self {
        Self {
            tasks,
            calls,
            policy,
        }
    }

    pub async fn get(&self, id: i32) -> Result<DialTask, DomainError> {
        self.tasks
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("DialTask", id))
    }

    pub async fn update(
        &self,
        id: i32,
        changes: DialTaskChanges,
        now: DateTime<Utc>,
    ) -> Result<DialTask, DomainError> {
        let mut task = self.get(id).await?;
        task.apply(changes, now);
        task.validate()?;

        let saved = self.tasks.update(&task).await?;
        tracing::info!("Updated task {} ({}), status {}", saved.task_name, saved.id, saved.status);
        Ok(saved)
    }

    /// Delete a task with its calls and their tags
    pub async fn delete(&self, id: i32) -> Result<(), DomainError> {
        self.tasks.delete(id).await?;
        tracing::info!("Deleted task {}", id);
        Ok(())
    }

    /// Store a call with its tags, then recount the task
    pub async fn record_call(
        &self,
        task_id: i32,
        draft: NewCall,
        tags: Vec<NewCallTag>,
        now: DateTime<Utc>,
    ) -> Result<RecordedCall, DomainError> {
        let task = self.get(task_id).await?;
        let call = Call::record(task_id, draft, now)?;
        let tags: Vec<CallTag> = tags
            .into_iter()
            .map(|tag| CallTag::from_draft(tag, now))
            .collect();

        let (call, tags) = self.calls.record_call(&call, &tags).await?;
        tracing::info!(
            task_id,
            call_id = call.id,
            result = %call.result,
            tags = tags.len(),
            "Recorded call"
        );

        let task = self.recompute_task(task, now).await?;
        Ok(RecordedCall { call, tags, task })
    }

    /// One page of the task's calls, newest first
    pub async fn list_calls(
        &self,
        task_id: i32,
        result: Option<CallResult>,
        page: PageRequest,
    ) -> Result<(Vec<Call>, Pagination), DomainError> {
        self.get(task_id).await?;
        let (calls, total) = self.calls.find_page_by_task(task_id, result, &page).await?;
        Ok((calls, page.paginate(total)))
    }

    /// Recount the task's calls and save the counters
    pub async fn recompute(&self, id: i32, now: DateTime<Utc>) -> Result<DialTask, DomainError> {
        let task = self.get(id).await?;
        self.recompute_task(task, now).await
    }

    /// Recount every task of a package
    pub async fn recompute_package(
        &self,
        package_id: i32,
        now: DateTime<Utc>,
    ) -> Result<Vec<DialTask>, DomainError> {
        let tasks = self.tasks.find_by_package(package_id).await?;
        let mut saved = Vec::with_capacity(tasks.len());

        for task in tasks {
            saved.push(self.recompute_task(task, now).await?);
        }

        tracing::info!("Recomputed {} tasks of package {}", saved.len(), package_id);
        Ok(saved)
    }

    async fn recompute_task(
        &self,
        mut task: DialTask,
        now: DateTime<Utc>,
    ) -> Result<DialTask, DomainError> {
        let calls = self.calls.find_by_task(task.id).await?;
        let call_ids: Vec<i32> = calls.iter().map(|c| c.id).collect();
        let tags = self.calls.find_tags_for_calls(&call_ids).await?;
        tracing::debug!(task_id = task.id, calls = calls.len(), tags = tags.len(), "Loaded task calls");

        let tags_by_call = metrics::group_tags_by_call(tags);
        metrics::compute_task_metrics(&mut task, &calls, &tags_by_call, &self.policy);
        task.updated_at = now;

        let saved = self.tasks.save_metrics(&task).await?;
        tracing::info!(
            "Recomputed task {} ({}): {}/{} connected, {} interested",
            saved.task_name,
            saved.id,
            saved.connected_calls,
            saved.total_calls,
            saved.interested_calls
        );

        Ok(saved)
    }
}
