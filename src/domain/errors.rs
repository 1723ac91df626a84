//! Domain errors for the Amber dispatch core.
//!
//! The pipeline never lets these escape `execute_command`: every stage
//! failure is folded into a [`ToolResult`](crate::domain::models::ToolResult)
//! tagged with a [`ToolErrorKind`]. The error enums here are used at the
//! construction and registration boundaries, and by collaborators.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Closed taxonomy of failure kinds, one per pipeline stage plus the
/// construction-time and audit kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolErrorKind {
    /// Tool metadata or parameter descriptors are malformed.
    MalformedTool,
    /// No tool is registered for the invocation alias.
    CommandNotFound,
    /// Caller is unknown or inactive.
    AuthenticationRequired,
    /// Caller lacks a required permission.
    PermissionDenied,
    /// Supplied parameters violate the tool's descriptors.
    ValidationError,
    /// The tool failed, crashed or timed out.
    ExecutionError,
    /// The audit sink rejected a record. Never surfaced to callers.
    AuditFailure,
}

impl ToolErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MalformedTool => "malformed_tool",
            Self::CommandNotFound => "command_not_found",
            Self::AuthenticationRequired => "authentication_required",
            Self::PermissionDenied => "permission_denied",
            Self::ValidationError => "validation_error",
            Self::ExecutionError => "execution_error",
            Self::AuditFailure => "audit_failure",
        }
    }

    /// Whether a caller can reasonably retry after this failure.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::MalformedTool)
    }
}

impl fmt::Display for ToolErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while constructing a tool handle.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Malformed tool '{tool}': {reason}")]
    MalformedTool { tool: String, reason: String },

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
}

impl ToolError {
    pub fn malformed(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedTool {
            tool: tool.into(),
            reason: reason.into(),
        }
    }
}

/// Registration conflicts. Checked before any mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Tool '{0}' is already registered")]
    DuplicateName(String),

    #[error("Alias '{alias}' is already registered, owned by tool '{owner}'")]
    DuplicateAlias { alias: String, owner: String },
}

/// Parameter validation failures.
///
/// The `Display` text is what ends up in the user-facing validation message,
/// so it names the parameter and the violated rule.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParameterError {
    #[error("required parameter '{0}' was not provided")]
    Missing(String),

    #[error("parameter '{name}' must be of type {expected}")]
    WrongType { name: String, expected: String },

    #[error("parameter '{name}' must have at least {min} characters")]
    TooShort { name: String, min: usize },

    #[error("parameter '{name}' must have at most {max} characters")]
    TooLong { name: String, max: usize },

    #[error("parameter '{name}' must have at least {min} elements")]
    TooFewElements { name: String, min: usize },

    #[error("parameter '{name}' must have at most {max} elements")]
    TooManyElements { name: String, max: usize },

    #[error("parameter '{name}' must be greater than or equal to {min}")]
    BelowMinimum { name: String, min: f64 },

    #[error("parameter '{name}' must be less than or equal to {max}")]
    AboveMaximum { name: String, max: f64 },

    #[error("parameter '{name}' does not match pattern '{pattern}'")]
    PatternMismatch { name: String, pattern: String },

    #[error("parameter '{name}' must be one of: {allowed}")]
    NotAllowed { name: String, allowed: String },

    #[error("{0}")]
    Invalid(String),
}

/// Errors from probing the execution context for required components.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("Unknown component: {0}")]
    UnknownComponent(String),

    #[error("Required component not available: {0}")]
    MissingComponent(String),
}

impl ContextError {
    /// Name of the component that caused the failure.
    pub fn component(&self) -> &str {
        match self {
            Self::UnknownComponent(name) | Self::MissingComponent(name) => name,
        }
    }
}

/// Failures reported by injected collaborators (identity, permission,
/// language agent, data session).
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Service request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid service response: {0}")]
    InvalidResponse(String),
}

/// Failures writing an audit record.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Audit sink unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to serialize audit record: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to write audit record: {0}")]
    Io(#[from] std::io::Error),
}

pub type ToolConstructionResult<T> = Result<T, ToolError>;
