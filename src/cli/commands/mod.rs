//! CLI command implementations.

pub mod config;
pub mod run;
pub mod tools;

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::services::{initialize_builtin_tools, ToolRegistry};

/// Registry holding the built-in tools.
pub(crate) fn builtin_registry() -> Result<Arc<ToolRegistry>> {
    let mut registry = ToolRegistry::new();
    initialize_builtin_tools(&mut registry).context("Failed to register built-in tools")?;
    Ok(Arc::new(registry))
}
