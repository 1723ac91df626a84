//! Outcome of a tool invocation.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

use crate::domain::errors::ToolErrorKind;

/// Generic user-facing text used when a failure carries no friendlier message.
pub const DEFAULT_USER_ERROR: &str = "An error occurred while executing the command";

/// Success payload or failure detail. Exactly one is ever present.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolOutcome {
    Success {
        data: Value,
    },
    Failure {
        kind: ToolErrorKind,
        /// Internal detail; logged and audited, never shown to the end user.
        error: String,
        /// Safe message for the end user.
        user_error: String,
    },
}

/// Result of running a tool through the pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct ToolResult {
    #[serde(flatten)]
    outcome: ToolOutcome,
    pub metadata: HashMap<String, Value>,
    #[serde(rename = "execution_time_ms", serialize_with = "serialize_millis")]
    execution_time: Option<Duration>,
    pub timestamp: DateTime<Utc>,
}

impl ToolResult {
    fn from_outcome(outcome: ToolOutcome) -> Self {
        Self {
            outcome,
            metadata: HashMap::new(),
            execution_time: None,
            timestamp: Utc::now(),
        }
    }

    /// Successful result carrying `data`.
    pub fn success(data: impl Into<Value>) -> Self {
        Self::from_outcome(ToolOutcome::Success { data: data.into() })
    }

    /// Handler-level failure (`ExecutionError`) with the generic user message
    /// unless one is supplied.
    pub fn failure(error: impl Into<String>, user_error: Option<String>) -> Self {
        Self::error(ToolErrorKind::ExecutionError, error, user_error)
    }

    /// Failure of a specific kind. A missing or blank `user_error` becomes
    /// [`DEFAULT_USER_ERROR`].
    pub fn error(kind: ToolErrorKind, error: impl Into<String>, user_error: Option<String>) -> Self {
        Self::from_outcome(ToolOutcome::Failure {
            kind,
            error: error.into(),
            user_error: user_error
                .filter(|message| !message.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_USER_ERROR.to_string()),
        })
    }

    /// Re-tag a failure as `ExecutionError`, keeping both messages.
    /// Successes are returned unchanged.
    pub fn into_execution_failure(mut self) -> Self {
        if let ToolOutcome::Failure { ref mut kind, .. } = self.outcome {
            *kind = ToolErrorKind::ExecutionError;
        }
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, ToolOutcome::Success { .. })
    }

    pub fn outcome(&self) -> &ToolOutcome {
        &self.outcome
    }

    pub fn data(&self) -> Option<&Value> {
        match &self.outcome {
            ToolOutcome::Success { data } => Some(data),
            ToolOutcome::Failure { .. } => None,
        }
    }

    pub fn into_data(self) -> Option<Value> {
        match self.outcome {
            ToolOutcome::Success { data } => Some(data),
            ToolOutcome::Failure { .. } => None,
        }
    }

    /// Internal error detail.
    pub fn error_message(&self) -> Option<&str> {
        match &self.outcome {
            ToolOutcome::Failure { error, .. } => Some(error),
            ToolOutcome::Success { .. } => None,
        }
    }

    pub fn user_error(&self) -> Option<&str> {
        match &self.outcome {
            ToolOutcome::Failure { user_error, .. } => Some(user_error),
            ToolOutcome::Success { .. } => None,
        }
    }

    pub fn error_kind(&self) -> Option<ToolErrorKind> {
        match &self.outcome {
            ToolOutcome::Failure { kind, .. } => Some(*kind),
            ToolOutcome::Success { .. } => None,
        }
    }

    pub fn execution_time(&self) -> Option<Duration> {
        self.execution_time
    }

    pub(crate) fn stamp(&mut self, elapsed: Duration) {
        self.execution_time = Some(elapsed);
    }
}

fn serialize_millis<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(duration) => serializer.serialize_some(&(duration.as_secs_f64() * 1000.0)),
        None => serializer.serialize_none(),
    }
}
