//! Tool inspection commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;

use super::builtin_registry;
use crate::cli::output::{output, table, truncate, CommandOutput};
use crate::domain::models::ToolCategory;
use crate::domain::ports::{IdentityService, PermissionService};
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::{StaticIdentityStore, StaticPermissionStore};
use crate::services::{tool_summary, ToolSummary};

#[derive(Args, Debug)]
pub struct ToolsArgs {
    #[command(subcommand)]
    pub command: ToolsCommands,
}

#[derive(Subcommand, Debug)]
pub enum ToolsCommands {
    /// List registered tools
    List {
        /// Only list this category (e.g. data_query, utility)
        #[arg(short, long)]
        category: Option<String>,
    },
    /// List the tools a caller may run, per the configured identities
    Available {
        /// Caller id
        #[arg(short, long)]
        caller: i64,
    },
    /// Show one tool and its parameters
    Show {
        /// Tool name
        name: String,
    },
}

#[derive(Debug, Serialize)]
pub struct ToolListOutput {
    pub tools: Vec<ToolSummary>,
    pub total: usize,
}

impl CommandOutput for ToolListOutput {
    fn to_human(&self) -> String {
        if self.tools.is_empty() {
            return "No tools found.".to_string();
        }

        let mut t = table(&["NAME", "ALIASES", "CATEGORY", "AUTH", "DESCRIPTION"]);
        for tool in &self.tools {
            t.add_row(vec![
                tool.name.clone(),
                tool.aliases.join(", "),
                tool.category.to_string(),
                if tool.requires_auth { "yes" } else { "no" }.to_string(),
                truncate(&tool.description, 50),
            ]);
        }
        format!("Found {} tool(s):\n{t}", self.total)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
pub struct ToolDetailOutput {
    pub tool: ToolSummary,
}

impl CommandOutput for ToolDetailOutput {
    fn to_human(&self) -> String {
        let tool = &self.tool;
        let mut lines = vec![
            format!("Tool: {}", tool.name),
            format!("Version: {}", tool.version),
            format!("Category: {}", tool.category),
            format!("Aliases: {}", tool.aliases.join(", ")),
            format!("Requires auth: {}", tool.requires_auth),
            format!("Description: {}", tool.description),
        ];

        if !tool.required_permissions.is_empty() {
            lines.push(format!("Permissions: {}", tool.required_permissions.join(", ")));
        }

        if !tool.parameters.is_empty() {
            let mut t = table(&["PARAMETER", "TYPE", "REQUIRED", "DESCRIPTION"]);
            for param in &tool.parameters {
                t.add_row(vec![
                    param.name.clone(),
                    param.kind.as_str().to_string(),
                    param.required.to_string(),
                    param.description.clone(),
                ]);
            }
            lines.push(format!("\n{t}"));
        }

        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: ToolsArgs, json_mode: bool) -> Result<()> {
    let registry = builtin_registry()?;

    match args.command {
        ToolsCommands::List { category } => {
            let category = category
                .map(|c| c.parse::<ToolCategory>())
                .transpose()
                .map_err(anyhow::Error::msg)?;

            let tools: Vec<ToolSummary> = tool_summary(&registry)
                .tools
                .into_iter()
                .filter(|t| category.is_none_or(|c| t.category == c))
                .collect();

            let out = ToolListOutput {
                total: tools.len(),
                tools,
            };
            output(&out, json_mode);
        }

        ToolsCommands::Available { caller } => {
            let config = ConfigLoader::load().context("Failed to load configuration")?;
            let identities = StaticIdentityStore::from_entries(&config.identities);
            let permissions = StaticPermissionStore::from_entries(&config.identities);

            let tools: Vec<ToolSummary> = registry
                .available_for(
                    caller,
                    Some(&identities as &dyn IdentityService),
                    Some(&permissions as &dyn PermissionService),
                )
                .await
                .iter()
                .map(|t| ToolSummary::from(t.as_ref()))
                .collect();

            let out = ToolListOutput {
                total: tools.len(),
                tools,
            };
            output(&out, json_mode);
        }

        ToolsCommands::Show { name } => {
            let tool = registry
                .lookup_by_name(&name)
                .ok_or_else(|| anyhow::anyhow!("Tool not found: {name}"))?;

            let out = ToolDetailOutput {
                tool: ToolSummary::from(tool.as_ref()),
            };
            output(&out, json_mode);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_output_renders_builtin_tools() {
        let registry = builtin_registry().unwrap();
        let tools = tool_summary(&registry).tools;
        let out = ToolListOutput {
            total: tools.len(),
            tools,
        };

        let human = out.to_human();
        assert!(human.starts_with("Found 2 tool(s):"));
        assert!(human.contains("/query"));
        assert_eq!(out.to_json()["total"], 2);
    }

    #[test]
    fn test_empty_list_output() {
        let out = ToolListOutput {
            tools: Vec::new(),
            total: 0,
        };
        assert_eq!(out.to_human(), "No tools found.");
    }

    #[test]
    fn test_detail_output_lists_permissions_and_parameters() {
        let registry = builtin_registry().unwrap();
        let tool = registry.lookup_by_name("query").unwrap();
        let out = ToolDetailOutput {
            tool: ToolSummary::from(tool.as_ref()),
        };

        let human = out.to_human();
        assert!(human.contains("Tool: query"));
        assert!(human.contains("Permissions: /ia"));
        assert!(human.contains("PARAMETER"));
    }
}
