//! PackageTagSummary - Distribution of tag values across a package's calls

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One (tag_name, tag_value) bucket for a package.
///
/// Unique per (package_id, tag_name, tag_value).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PackageTagSummary {
    pub id: i32,
    pub package_id: i32,
    pub tag_name: String,
    pub tag_value: Option<String>,
    pub tag_count: i32,
    /// Share of this value among all values of the same tag name (0-1)
    pub percentage: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
