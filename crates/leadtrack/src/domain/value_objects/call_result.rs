//! CallResult - Outcome of a single dial attempt

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// Outcome recorded for a call
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "snake_case")]
pub enum CallResult {
    Connected,
    Voicemail,
    Busy,
    #[default]
    NoAnswer,
    Rejected,
}

impl CallResult {
    /// Whether the result code itself says the call got through
    pub fn is_connected(&self) -> bool {
        matches!(self, CallResult::Connected)
    }
}

impl std::fmt::Display for CallResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallResult::Connected => write!(f, "connected"),
            CallResult::Voicemail => write!(f, "voicemail"),
            CallResult::Busy => write!(f, "busy"),
            CallResult::NoAnswer => write!(f, "no_answer"),
            CallResult::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for CallResult {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "connected" => Ok(CallResult::Connected),
            "voicemail" => Ok(CallResult::Voicemail),
            "busy" => Ok(CallResult::Busy),
            "no_answer" => Ok(CallResult::NoAnswer),
            "rejected" => Ok(CallResult::Rejected),
            _ => Err(DomainError::Validation(format!("Unknown call result: {}", s))),
        }
    }
}
