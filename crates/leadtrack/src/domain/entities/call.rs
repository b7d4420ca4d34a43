//! Call - A single phone contact attempt
//!
//! Pure domain entity without infrastructure dependencies.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use crate::domain::value_objects::CallResult;

/// Call - Record of one dial attempt within a task
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Call {
    pub id: i32,
    pub task_id: i32,
    pub phone_number: String,
    pub call_time: DateTime<Utc>,
    /// Talk time in seconds
    pub duration: i32,
    pub result: CallResult,
    pub notes: Option<String>,
    pub customer_name: Option<String>,
    pub company: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A dial attempt as reported by the caller; `call_time` defaults to now
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewCall {
    pub phone_number: String,
    pub call_time: Option<DateTime<Utc>>,
    pub duration: i32,
    pub result: CallResult,
    pub notes: Option<String>,
    pub customer_name: Option<String>,
    pub company: Option<String>,
}

impl Call {
    /// Create an unsaved call dialed at `call_time`
    pub fn new(
        task_id: i32,
        phone_number: String,
        call_time: DateTime<Utc>,
        duration: i32,
        result: CallResult,
    ) -> Self {
        Self {
            id: 0,
            task_id,
            phone_number,
            call_time,
            duration,
            result,
            notes: None,
            customer_name: None,
            company: None,
            created_at: call_time,
            updated_at: call_time,
        }
    }

    /// Build an unsaved call from a report, dialed at `now` unless it says otherwise
    pub fn record(task_id: i32, draft: NewCall, now: DateTime<Utc>) -> Result<Self, DomainError> {
        if draft.phone_number.trim().is_empty() {
            return Err(DomainError::Validation("phone_number is required".into()));
        }
        if draft.duration < 0 {
            return Err(DomainError::Validation(format!(
                "duration cannot be negative: {}",
                draft.duration
            )));
        }

        let mut call = Self::new(
            task_id,
            draft.phone_number,
            draft.call_time.unwrap_or(now),
            draft.duration,
            draft.result,
        );
        call.notes = draft.notes;
        call.customer_name = draft.customer_name;
        call.company = draft.company;
        call.created_at = now;
        call.updated_at = now;
        Ok(call)
    }

    /// A call counts as connected when the result says so or any talk time was recorded
    pub fn is_connected(&self) -> bool {
        self.result.is_connected() || self.duration > 0
    }

    /// UTC calendar day of the dial attempt
    pub fn call_date(&self) -> NaiveDate {
        self.call_time.date_naive()
    }

    /// Talk time in minutes, two decimals
    pub fn duration_minutes(&self) -> f64 {
        (f64::from(self.duration) / 60.0 * 100.0).round() / 100.0
    }
}
