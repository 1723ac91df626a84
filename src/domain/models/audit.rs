//! Audit records emitted after every executed invocation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::ToolErrorKind;
use crate::domain::models::identity::CallerId;

/// One invocation outcome, as handed to an [`AuditSink`](crate::domain::ports::AuditSink).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub caller_id: CallerId,
    pub tool_name: String,
    /// Alias the caller used to reach the tool.
    pub alias: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ToolErrorKind>,
    pub duration_ms: f64,
    /// Truncated, scrubbed internal error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuditRecord {
    pub fn new(caller_id: CallerId, tool_name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            caller_id,
            tool_name: tool_name.into(),
            alias: alias.into(),
            success: true,
            error_kind: None,
            duration_ms: 0.0,
            error: None,
        }
    }

    pub fn with_duration_ms(mut self, duration_ms: f64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn with_failure(mut self, kind: ToolErrorKind, error: impl Into<String>) -> Self {
        self.success = false;
        self.error_kind = Some(kind);
        self.error = Some(error.into());
        self
    }
}
