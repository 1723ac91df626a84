pub mod audit;
pub mod config;
pub mod identity;
pub mod result;
pub mod tool;

pub use audit::AuditRecord;
pub use config::{
    AuditConfig, AuditSinkKind, Config, IdentityEntry, LoggingConfig, OrchestratorConfig,
    PolicyMode,
};
pub use identity::{CallerId, ChannelId, Identity, PermissionDecision};
pub use result::{ToolOutcome, ToolResult, DEFAULT_USER_ERROR};
pub use tool::{ParameterType, Parameters, ToolCategory, ToolMetadata, ToolParameter, ValidationRules};
