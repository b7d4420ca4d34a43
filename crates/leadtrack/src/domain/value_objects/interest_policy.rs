//! InterestPolicy - Which call tags mark a contact as interested

use serde::{Deserialize, Serialize};

use crate::domain::entities::CallTag;

/// Rule deciding whether a call showed buying interest.
///
/// A call counts as interested when any of its tags is named `tag_name` and
/// carries one of `values` (exact match).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InterestPolicy {
    pub tag_name: String,
    pub values: Vec<String>,
}

impl Default for InterestPolicy {
    fn default() -> Self {
        Self {
            tag_name: "interest_level".to_string(),
            values: vec!["high".to_string()],
        }
    }
}

impl InterestPolicy {
    pub fn new(tag_name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            values,
        }
    }

    /// Whether a single tag signals interest
    pub fn matches(&self, tag: &CallTag) -> bool {
        tag.tag_name == self.tag_name
            && tag
                .tag_value
                .as_deref()
                .is_some_and(|value| self.values.iter().any(|v| v == value))
    }

    /// Whether any tag in the set signals interest
    pub fn is_interested<'a, I>(&self, tags: I) -> bool
    where
        I: IntoIterator<Item = &'a CallTag>,
    {
        tags.into_iter().any(|tag| self.matches(tag))
    }
}
