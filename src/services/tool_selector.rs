//! LLM-driven tool selection.
//!
//! Describes the registered tools to the language agent and asks it to pick
//! one for a free-text request. The selector only names a tool; running it is
//! left to the orchestrator.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::domain::ports::LanguageAgent;
use crate::services::registry::ToolRegistry;
use crate::services::tool::ToolHandle;

const FALLBACK_TOOL: &str = "query";
const FALLBACK_CONFIDENCE: f64 = 0.3;
const NAME_MATCH_CONFIDENCE: f64 = 0.5;

/// Outcome of a selection attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSelection {
    pub selected_tool: Option<String>,
    /// 0.0 to 1.0
    pub confidence: f64,
    pub reasoning: Option<String>,
    /// Set when the answer did not come from a well-formed agent reply.
    pub fallback_used: bool,
}

impl ToolSelection {
    fn none(reasoning: &str) -> Self {
        Self {
            selected_tool: None,
            confidence: 0.0,
            reasoning: Some(reasoning.to_string()),
            fallback_used: true,
        }
    }

    pub fn has_selection(&self) -> bool {
        self.selected_tool.is_some()
    }
}

#[derive(Debug, Deserialize)]
struct SelectionReply {
    #[serde(default)]
    tool: String,
    #[serde(default)]
    confidence: f64,
    #[serde(default)]
    reasoning: Option<String>,
}

pub struct ToolSelector {
    registry: Arc<ToolRegistry>,
    agent: Arc<dyn LanguageAgent>,
    json_object: Option<Regex>,
}

impl ToolSelector {
    pub fn new(registry: Arc<ToolRegistry>, agent: Arc<dyn LanguageAgent>) -> Self {
        Self {
            registry,
            agent,
            json_object: Regex::new(r"(?s)\{[^}]+\}").ok(),
        }
    }

    /// Pick a tool for `request`.
    ///
    /// `candidates` restricts the choice to the named tools; `None` offers
    /// every registered tool. Agent failures fall back to the query tool.
    #[instrument(skip(self, request), fields(request_len = request.len()))]
    pub async fn select(&self, request: &str, candidates: Option<&[&str]>) -> ToolSelection {
        let tools = self.candidates(candidates);
        if tools.is_empty() {
            warn!("No tools available for selection");
            return ToolSelection {
                fallback_used: false,
                ..ToolSelection::none("No tools available")
            };
        }

        let prompt = render_prompt(request, &tools);
        debug!(prompt_len = prompt.len(), "Selection prompt rendered");

        match self.agent.process(&prompt).await {
            Ok(reply) => {
                let selection = self.parse_reply(&reply, &tools);
                info!(
                    tool = ?selection.selected_tool,
                    confidence = selection.confidence,
                    fallback = selection.fallback_used,
                    "Tool selected"
                );
                selection
            }
            Err(e) => {
                warn!(error = %e, "Tool selection failed, using fallback tool");
                ToolSelection {
                    selected_tool: Some(FALLBACK_TOOL.to_string()),
                    confidence: FALLBACK_CONFIDENCE,
                    reasoning: Some("Automatic fallback after selection error".to_string()),
                    fallback_used: true,
                }
            }
        }
    }

    fn candidates(&self, names: Option<&[&str]>) -> Vec<Arc<ToolHandle>> {
        match names {
            Some(names) => names
                .iter()
                .filter_map(|name| self.registry.lookup_by_name(name))
                .collect(),
            None => self.registry.all(),
        }
    }

    fn parse_reply(&self, reply: &str, tools: &[Arc<ToolHandle>]) -> ToolSelection {
        let parsed = self
            .json_object
            .as_ref()
            .and_then(|pattern| pattern.find(reply))
            .and_then(|m| serde_json::from_str::<SelectionReply>(m.as_str()).ok());

        if let Some(parsed) = parsed {
            let wanted = parsed.tool.to_lowercase();
            if let Some(tool) = tools.iter().find(|t| t.name().to_lowercase() == wanted) {
                return ToolSelection {
                    selected_tool: Some(tool.name().to_string()),
                    confidence: parsed.confidence.clamp(0.0, 1.0),
                    reasoning: parsed.reasoning,
                    fallback_used: false,
                };
            }
            warn!(tool = %parsed.tool, "Agent selected an unavailable tool");
        }

        let reply = reply.to_lowercase();
        tools
            .iter()
            .find(|t| reply.contains(&t.name().to_lowercase()))
            .map_or_else(
                || ToolSelection::none("Could not identify a suitable tool"),
                |tool| ToolSelection {
                    selected_tool: Some(tool.name().to_string()),
                    confidence: NAME_MATCH_CONFIDENCE,
                    reasoning: Some("Detected by tool name match".to_string()),
                    fallback_used: true,
                },
            )
    }
}

impl std::fmt::Debug for ToolSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolSelector")
            .field("tools", &self.registry.len())
            .finish_non_exhaustive()
    }
}

fn render_prompt(request: &str, tools: &[Arc<ToolHandle>]) -> String {
    let mut prompt = String::from(
        "Choose the single best tool for the user request below.\n\
         Reply with JSON only: {\"tool\": \"<name>\", \"confidence\": <0.0-1.0>, \"reasoning\": \"<why>\"}\n\n\
         Available tools:\n",
    );

    for tool in tools {
        let _ = write!(
            prompt,
            "\n**{}**\n- Aliases: {}\n- Description: {}\n- Category: {}\n- Parameters:\n",
            tool.name(),
            tool.aliases().join(", "),
            tool.description(),
            tool.category(),
        );
        if tool.parameters().is_empty() {
            prompt.push_str("  none\n");
        }
        for param in tool.parameters() {
            let _ = writeln!(
                prompt,
                "  - {} ({}): {} [{}]",
                param.name,
                param.kind.as_str(),
                param.description,
                if param.required { "required" } else { "optional" },
            );
        }
    }

    let _ = write!(prompt, "\nUser request: {request}\n");
    prompt
}
