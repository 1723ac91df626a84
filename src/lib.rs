//! Amber - command dispatch core for a conversational assistant
//!
//! Tools register under one or more command aliases. Every invocation runs
//! through the same pipeline: resolve the alias, authenticate the caller,
//! authorize each required permission, validate parameters, execute with
//! crash isolation, then stamp the duration and write an audit record.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): tool descriptors, results, error taxonomy and collaborator ports
//! - **Service Layer** (`services`): tool contract, registry, execution context, orchestrator
//! - **Infrastructure Layer** (`infrastructure`): config loading, logging, audit file sink, static policy stores
//! - **CLI Layer** (`cli`): command-line driver
//!
//! # Example
//!
//! ```ignore
//! use amber::services::{initialize_builtin_tools, ExecutionContext, ToolOrchestrator, ToolRegistry};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut registry = ToolRegistry::new();
//!     initialize_builtin_tools(&mut registry)?;
//!
//!     let orchestrator = ToolOrchestrator::new(Arc::new(registry));
//!     let context = ExecutionContext::builder().build();
//!     let result = orchestrator
//!         .execute_command(42, "/help", Default::default(), &context)
//!         .await;
//!     assert!(result.is_success());
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{ParameterError, RegistryError, ToolError, ToolErrorKind};
pub use domain::models::{
    CallerId, Config, Identity, ParameterType, Parameters, PermissionDecision, ToolCategory,
    ToolMetadata, ToolParameter, ToolResult,
};
pub use domain::ports::{AuditSink, IdentityService, PermissionService};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{
    ExecutionContext, ExecutionContextBuilder, Tool, ToolHandle, ToolOrchestrator, ToolRegistry,
};
