//! MetricsSummary - Daily aggregated figures
//!
//! A materialized cache of the daily summary calculation, one row per date.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// MetricsSummary - Totals and averages for one calendar day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricsSummary {
    pub id: i32,
    pub date: NaiveDate,
    pub total_packages: i32,
    pub new_packages: i32,
    pub total_leads: i64,
    pub total_calls: i32,
    pub connected_calls: i32,
    /// Seconds
    pub total_duration: i64,
    pub avg_contact_rate: f64,
    pub avg_interest_rate: f64,
    /// Seconds, integer division of total duration by connected calls
    pub avg_call_duration: i32,
    pub total_cost: f64,
    pub total_revenue: f64,
    pub roi: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MetricsSummary {
    /// Create an empty, unsaved summary for `date`
    pub fn new(date: NaiveDate, now: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            date,
            total_packages: 0,
            new_packages: 0,
            total_leads: 0,
            total_calls: 0,
            connected_calls: 0,
            total_duration: 0,
            avg_contact_rate: 0.0,
            avg_interest_rate: 0.0,
            avg_call_duration: 0,
            total_cost: 0.0,
            total_revenue: 0.0,
            roi: 0.0,
            created_at: now,
            updated_at: now,
        }
    }
}
