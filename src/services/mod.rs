//! Application services: the tool contract, registry, execution context and
//! the dispatch pipeline, plus the built-in tools and their helpers.

pub mod audit_log;
pub mod builtin_tools;
pub mod execution_context;
pub mod orchestrator;
pub mod registry;
pub mod tool;
pub mod tool_initializer;
pub mod tool_selector;

pub use audit_log::{
    audit_sink_from_config, AuditFilter, AuditLogService, AuditStats, TracingAuditSink,
};
pub use builtin_tools::{HelpTool, QueryTool};
pub use execution_context::{ContextSummary, ExecutionContext, ExecutionContextBuilder};
pub use orchestrator::{OrchestratorStats, ToolOrchestrator};
pub use registry::{RegistryStats, ToolRegistry};
pub use tool::{ParameterSchema, Tool, ToolHandle};
pub use tool_initializer::{
    initialize_builtin_tools, tool_summary, ToolCatalog, ToolSummary, TOOL_CATALOG_SERVICE,
};
pub use tool_selector::{ToolSelection, ToolSelector};
