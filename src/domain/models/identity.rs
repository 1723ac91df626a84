//! Caller identity and permission decisions returned by policy collaborators.

use serde::{Deserialize, Serialize};

/// External identifier of the caller (e.g. a chat user id).
pub type CallerId = i64;

/// External identifier of the conversation channel.
pub type ChannelId = i64;

/// A known caller as reported by the identity service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Identifier used by the permission store, distinct from the caller id.
    pub internal_id: i64,
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl Identity {
    pub fn active(internal_id: i64) -> Self {
        Self {
            internal_id,
            is_active: true,
            display_name: None,
        }
    }

    pub fn inactive(internal_id: i64) -> Self {
        Self {
            internal_id,
            is_active: false,
            display_name: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}

/// Answer from the permission service for one permission string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionDecision {
    pub allowed: bool,
    /// Human-readable explanation, shown to the user on denial.
    pub reason: String,
}

impl PermissionDecision {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: "allowed".to_string(),
        }
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: reason.into(),
        }
    }
}
