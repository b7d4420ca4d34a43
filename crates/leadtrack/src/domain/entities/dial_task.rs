//! DialTask - Outbound calling campaign against a package
//!
//! Pure domain entity without infrastructure dependencies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use crate::domain::value_objects::TaskStatus;

const MAX_TASK_NAME_LEN: usize = 255;

/// DialTask - One calling session against a lead package
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DialTask {
    pub id: i32,
    pub package_id: i32,
    pub task_name: String,
    pub description: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub status: TaskStatus,
    pub total_calls: i32,
    pub connected_calls: i32,
    pub interested_calls: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Attributes supplied when scheduling a task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDialTask {
    pub task_name: String,
    pub description: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

/// Task edits; `None` leaves the stored value alone
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DialTaskChanges {
    pub task_name: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl DialTask {
    /// Create an unsaved pending task (id 0)
    pub fn new(package_id: i32, task_name: String, now: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            package_id,
            task_name,
            description: None,
            start_time: None,
            end_time: None,
            status: TaskStatus::Pending,
            total_calls: 0,
            connected_calls: 0,
            interested_calls: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create an unsaved pending task from a draft
    pub fn from_draft(package_id: i32, draft: NewDialTask, now: DateTime<Utc>) -> Self {
        Self {
            description: draft.description,
            start_time: draft.start_time,
            end_time: draft.end_time,
            ..Self::new(package_id, draft.task_name, now)
        }
    }

    pub fn apply(&mut self, changes: DialTaskChanges, now: DateTime<Utc>) {
        if let Some(name) = changes.task_name {
            self.task_name = name;
        }
        if let Some(description) = changes.description {
            self.description = Some(description);
        }
        if let Some(status) = changes.status {
            self.status = status;
        }
        if let Some(start) = changes.start_time {
            self.start_time = Some(start);
        }
        if let Some(end) = changes.end_time {
            self.end_time = Some(end);
        }
        self.updated_at = now;
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        let len = self.task_name.chars().count();
        if self.task_name.trim().is_empty() || len > MAX_TASK_NAME_LEN {
            return Err(DomainError::Validation(format!(
                "task_name must be 1-{} characters",
                MAX_TASK_NAME_LEN
            )));
        }
        if let (Some(start), Some(end)) = (self.start_time, self.end_time) {
            if end < start {
                return Err(DomainError::Validation(format!(
                    "end_time {} is before start_time {}",
                    end, start
                )));
            }
        }
        Ok(())
    }

    /// Connected share of all calls, 0 when nothing was dialed
    pub fn contact_rate(&self) -> f64 {
        if self.total_calls == 0 {
            return 0.0;
        }
        f64::from(self.connected_calls) / f64::from(self.total_calls)
    }

    /// Interested share of connected calls, 0 when nothing connected
    pub fn interest_rate(&self) -> f64 {
        if self.connected_calls == 0 {
            return 0.0;
        }
        f64::from(self.interested_calls) / f64::from(self.connected_calls)
    }
}
