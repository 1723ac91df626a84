//! Start-up registration of built-in tools and the tool catalog.

use serde::Serialize;
use std::fmt::Write as _;
use tracing::info;

use crate::domain::errors::ToolError;
use crate::domain::models::{ToolCategory, ToolParameter};
use crate::services::builtin_tools::{HelpTool, QueryTool};
use crate::services::registry::{RegistryStats, ToolRegistry};
use crate::services::tool::ToolHandle;

/// Named service under which the catalog is exposed to tools.
pub const TOOL_CATALOG_SERVICE: &str = "tool_catalog";

/// Public description of one registered tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSummary {
    pub name: String,
    pub description: String,
    pub aliases: Vec<String>,
    pub category: ToolCategory,
    pub requires_auth: bool,
    pub required_permissions: Vec<String>,
    pub version: String,
    pub parameters: Vec<ToolParameter>,
}

impl From<&ToolHandle> for ToolSummary {
    fn from(tool: &ToolHandle) -> Self {
        let metadata = tool.metadata();
        Self {
            name: metadata.name.clone(),
            description: metadata.description.clone(),
            aliases: metadata.aliases.clone(),
            category: metadata.category,
            requires_auth: metadata.requires_auth,
            required_permissions: metadata.required_permissions.clone(),
            version: metadata.version.clone(),
            parameters: tool.parameters().to_vec(),
        }
    }
}

/// Snapshot of the registry for documentation and help output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolCatalog {
    pub total_tools: usize,
    pub tools: Vec<ToolSummary>,
    pub aliases: Vec<String>,
    pub stats: RegistryStats,
}

impl ToolCatalog {
    /// One line per tool: primary alias, other aliases, description.
    pub fn render_text(&self, category: Option<ToolCategory>) -> String {
        let mut text = String::from("Available commands:\n");
        for tool in self
            .tools
            .iter()
            .filter(|t| category.is_none_or(|c| t.category == c))
        {
            let Some((primary, others)) = tool.aliases.split_first() else {
                continue;
            };
            let _ = write!(text, "\n{primary}");
            if !others.is_empty() {
                let _ = write!(text, " ({})", others.join(", "));
            }
            let _ = writeln!(text, " - {}", tool.description);
        }
        text
    }
}

/// Register every built-in tool.
///
/// Fails on the first malformed tool or collision; this is a start-up
/// defect, not something to recover from.
pub fn initialize_builtin_tools(registry: &mut ToolRegistry) -> Result<(), ToolError> {
    let builtins = [ToolHandle::new(QueryTool)?, ToolHandle::new(HelpTool)?];
    let expected = builtins.len();

    for handle in builtins {
        registry.register(handle)?;
    }

    info!(
        registered = expected,
        total = registry.len(),
        aliases = ?registry.alias_list(),
        "Built-in tools initialized"
    );
    Ok(())
}

pub fn tool_summary(registry: &ToolRegistry) -> ToolCatalog {
    let tools: Vec<ToolSummary> = registry
        .all()
        .iter()
        .map(|tool| ToolSummary::from(tool.as_ref()))
        .collect();

    ToolCatalog {
        total_tools: tools.len(),
        tools,
        aliases: registry.alias_list(),
        stats: registry.stats(),
    }
}
