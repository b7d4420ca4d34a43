//! TagType - Category of a call tag

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// Call tag category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TagType {
    InterestLevel,
    Industry,
    FollowUp,
    #[default]
    Custom,
}

impl std::fmt::Display for TagType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TagType::InterestLevel => write!(f, "interest_level"),
            TagType::Industry => write!(f, "industry"),
            TagType::FollowUp => write!(f, "follow_up"),
            TagType::Custom => write!(f, "custom"),
        }
    }
}

impl std::str::FromStr for TagType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "interest_level" => Ok(TagType::InterestLevel),
            "industry" => Ok(TagType::Industry),
            "follow_up" => Ok(TagType::FollowUp),
            "custom" => Ok(TagType::Custom),
            _ => Err(DomainError::Validation(format!("Unknown tag type: {}", s))),
        }
    }
}
