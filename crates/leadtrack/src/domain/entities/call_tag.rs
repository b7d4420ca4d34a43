//! CallTag - Label attached to a call

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use crate::domain::value_objects::TagType;

/// Tag reported together with a new call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewCallTag {
    pub tag_name: String,
    pub tag_value: Option<String>,
    #[serde(default)]
    pub tag_type: TagType,
}

impl std::str::FromStr for NewCallTag {
    type Err = DomainError;

    /// `name=value` or a bare `name`; well-known names pick their tag type
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, value) = match s.split_once('=') {
            Some((name, value)) => (name.trim(), Some(value.trim().to_string())),
            None => (s.trim(), None),
        };
        if name.is_empty() {
            return Err(DomainError::Validation(format!("Tag without a name: {:?}", s)));
        }

        Ok(Self {
            tag_name: name.to_string(),
            tag_value: value.filter(|v| !v.is_empty()),
            tag_type: name.parse().unwrap_or_default(),
        })
    }
}

/// CallTag - Qualitative outcome recorded on a call (interest level, industry, ...)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CallTag {
    pub id: i32,
    pub call_id: i32,
    pub tag_name: String,
    pub tag_value: Option<String>,
    pub tag_type: TagType,
    pub created_at: DateTime<Utc>,
}

impl CallTag {
    pub fn new(
        call_id: i32,
        tag_name: String,
        tag_value: Option<String>,
        tag_type: TagType,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: 0,
            call_id,
            tag_name,
            tag_value,
            tag_type,
            created_at: now,
        }
    }

    /// Unsaved tag for a call that has no id yet
    pub fn from_draft(draft: NewCallTag, now: DateTime<Utc>) -> Self {
        Self::new(0, draft.tag_name, draft.tag_value, draft.tag_type, now)
    }
}
