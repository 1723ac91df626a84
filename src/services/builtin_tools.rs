//! Tools shipped with Amber.

use async_trait::async_trait;
use tracing::{error, info};

use crate::domain::models::{
    CallerId, ParameterType, Parameters, ToolCategory, ToolMetadata, ToolParameter, ToolResult,
};
use crate::services::execution_context::ExecutionContext;
use crate::services::tool::Tool;
use crate::services::tool_initializer::{ToolCatalog, TOOL_CATALOG_SERVICE};

const QUERY_VERSION: &str = "2.0.0";
const QUERY_MIN_CHARS: usize = 3;
const QUERY_MAX_CHARS: usize = 1000;

/// Natural-language questions answered by the language agent.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryTool;

#[async_trait]
impl Tool for QueryTool {
    fn metadata(&self) -> ToolMetadata {
        ToolMetadata::new(
            "query",
            "Ask the database a question in natural language",
            ToolCategory::DataQuery,
        )
        .with_alias("/ia")
        .with_alias("/query")
        .with_permission("/ia")
        .with_version(QUERY_VERSION)
    }

    fn parameters(&self) -> Vec<ToolParameter> {
        vec![ToolParameter::new("query", ParameterType::String, "Question in natural language")
            .with_min_length(QUERY_MIN_CHARS)
            .with_max_length(QUERY_MAX_CHARS)]
    }

    async fn execute(
        &self,
        caller_id: CallerId,
        params: &Parameters,
        context: &ExecutionContext,
    ) -> anyhow::Result<ToolResult> {
        if let Err(e) = context.validate_required(&["language_agent"]) {
            error!(caller_id, error = %e, "Query tool cannot run");
            return Ok(ToolResult::failure(
                e.to_string(),
                Some("The system is not available right now".to_string()),
            ));
        }
        let Some(agent) = context.language_agent() else {
            return Ok(ToolResult::failure("language agent missing", None));
        };

        let question = params
            .get("query")
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        let preview: String = question.chars().take(50).collect();
        info!(caller_id, query = %preview, "Processing query");

        match agent.process(question).await {
            Ok(answer) => Ok(ToolResult::success(answer)
                .with_metadata("query_length", question.chars().count())
                .with_metadata("caller_id", caller_id)
                .with_metadata("tool_version", QUERY_VERSION)),
            Err(e) => {
                error!(caller_id, error = %e, "Language agent failed");
                Ok(ToolResult::failure(
                    e.to_string(),
                    Some("I had trouble with that question. Could you rephrase it?".to_string()),
                ))
            }
        }
    }
}

/// Lists the available commands.
///
/// Reads the catalog from the `tool_catalog` named service; without it a
/// short fallback text is returned.
#[derive(Debug, Clone, Copy, Default)]
pub struct HelpTool;

#[async_trait]
impl Tool for HelpTool {
    fn metadata(&self) -> ToolMetadata {
        ToolMetadata::new("help", "Show the available commands", ToolCategory::Utility)
            .with_alias("/help")
            .with_alias("/start")
            .with_auth(false)
    }

    fn parameters(&self) -> Vec<ToolParameter> {
        vec![ToolParameter::new("category", ParameterType::String, "Only list this category")
            .optional()
            .with_allowed_values(
                ToolCategory::ALL
                    .iter()
                    .map(|c| serde_json::Value::from(c.as_str()))
                    .collect(),
            )]
    }

    async fn execute(
        &self,
        _caller_id: CallerId,
        params: &Parameters,
        context: &ExecutionContext,
    ) -> anyhow::Result<ToolResult> {
        let Some(catalog) = context.service::<ToolCatalog>(TOOL_CATALOG_SERVICE) else {
            return Ok(ToolResult::success(
                "Send /ia followed by your question to query the data.",
            ));
        };

        let category = params
            .get("category")
            .and_then(|v| v.as_str())
            .and_then(|c| c.parse::<ToolCategory>().ok());

        Ok(ToolResult::success(catalog.render_text(category))
            .with_metadata("total_tools", catalog.total_tools))
    }
}
