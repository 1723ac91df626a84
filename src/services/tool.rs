//! The tool contract and its construction-validated handle.
//!
//! A [`Tool`] describes itself (metadata and parameter descriptors) and
//! exposes one async entry point. Tools never reach the registry directly:
//! they are wrapped in a [`ToolHandle`], whose constructor rejects malformed
//! descriptors before anything is registered.

use async_trait::async_trait;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::warn;

use crate::domain::errors::{ParameterError, ToolError};
use crate::domain::models::{CallerId, Parameters, ToolCategory, ToolMetadata, ToolParameter, ToolResult};
use crate::services::execution_context::ExecutionContext;

/// One self-describing, executable command.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Metadata describing the tool. Must be deterministic.
    fn metadata(&self) -> ToolMetadata;

    /// Parameter descriptors, used for validation and capability discovery.
    fn parameters(&self) -> Vec<ToolParameter> {
        Vec::new()
    }

    /// Run the tool.
    ///
    /// Expected failures (bad input, downstream unavailable) are returned as a
    /// failed [`ToolResult`]. An `Err` is treated like a crash: the
    /// orchestrator turns it into an `ExecutionError` with a generic user
    /// message.
    async fn execute(
        &self,
        caller_id: CallerId,
        params: &Parameters,
        context: &ExecutionContext,
    ) -> anyhow::Result<ToolResult>;

    /// Fill defaults and check every supplied value against its descriptor.
    ///
    /// `schema` is the tool's own descriptor list, compiled once by its
    /// [`ToolHandle`]. Override to add cross-field rules; call
    /// [`ParameterSchema::validate`] first to keep the per-descriptor checks.
    fn validate_parameters(
        &self,
        schema: &ParameterSchema,
        params: Parameters,
    ) -> Result<Parameters, ParameterError> {
        schema.validate(params)
    }
}

/// Parameter descriptors with their `pattern` rules compiled.
#[derive(Debug, Clone, Default)]
pub struct ParameterSchema {
    descriptors: Vec<ToolParameter>,
    patterns: HashMap<String, Regex>,
}

impl ParameterSchema {
    pub fn compile(descriptors: Vec<ToolParameter>) -> Result<Self, ParameterError> {
        let mut patterns = HashMap::new();
        for descriptor in &descriptors {
            if let Some(regex) = descriptor.compile_pattern()? {
                patterns.insert(descriptor.name.clone(), regex);
            }
        }
        Ok(Self {
            descriptors,
            patterns,
        })
    }

    pub fn descriptors(&self) -> &[ToolParameter] {
        &self.descriptors
    }

    pub fn pattern(&self, name: &str) -> Option<&Regex> {
        self.patterns.get(name)
    }

    /// Default parameter validation shared by every tool.
    ///
    /// Missing parameters with a default receive it; missing required
    /// parameters without one are rejected. Supplied parameters without a
    /// descriptor pass through unchecked.
    pub fn validate(&self, mut params: Parameters) -> Result<Parameters, ParameterError> {
        for descriptor in &self.descriptors {
            if params.contains_key(&descriptor.name) {
                continue;
            }
            match (&descriptor.default, descriptor.required) {
                (Some(default), _) => {
                    params.insert(descriptor.name.clone(), default.clone());
                }
                (None, true) => return Err(ParameterError::Missing(descriptor.name.clone())),
                (None, false) => {}
            }
        }

        for descriptor in &self.descriptors {
            if let Some(value) = params.get(&descriptor.name) {
                self.check(descriptor, value)?;
            }
        }

        Ok(params)
    }

    fn check(&self, descriptor: &ToolParameter, value: &serde_json::Value) -> Result<(), ParameterError> {
        descriptor.validate_with(value, self.pattern(&descriptor.name))
    }
}

/// A tool whose metadata and descriptors have been checked and cached.
pub struct ToolHandle {
    tool: Arc<dyn Tool>,
    metadata: ToolMetadata,
    schema: ParameterSchema,
}

impl ToolHandle {
    pub fn new<T: Tool + 'static>(tool: T) -> Result<Self, ToolError> {
        Self::from_arc(Arc::new(tool))
    }

    /// Validate the tool's self-description.
    ///
    /// Fails with [`ToolError::MalformedTool`] on an empty name, an empty or
    /// duplicated alias, a duplicated parameter name, an uncompilable pattern,
    /// or a default that violates its own descriptor.
    pub fn from_arc(tool: Arc<dyn Tool>) -> Result<Self, ToolError> {
        let metadata = tool.metadata();
        let parameters = tool.parameters();

        validate_metadata(&metadata)?;
        let schema = compile_descriptors(&metadata.name, parameters)?;

        if metadata.requires_auth && metadata.required_permissions.is_empty() {
            warn!(tool = %metadata.name, "Tool requires auth but declares no permissions");
        }

        Ok(Self {
            tool,
            metadata,
            schema,
        })
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn description(&self) -> &str {
        &self.metadata.description
    }

    pub fn aliases(&self) -> &[String] {
        &self.metadata.aliases
    }

    pub fn category(&self) -> ToolCategory {
        self.metadata.category
    }

    pub fn requires_auth(&self) -> bool {
        self.metadata.requires_auth
    }

    pub fn required_permissions(&self) -> &[String] {
        &self.metadata.required_permissions
    }

    pub fn metadata(&self) -> &ToolMetadata {
        &self.metadata
    }

    pub fn parameters(&self) -> &[ToolParameter] {
        self.schema.descriptors()
    }

    pub fn schema(&self) -> &ParameterSchema {
        &self.schema
    }

    /// Delegates to the tool so overrides apply.
    pub fn validate_parameters(&self, params: Parameters) -> Result<Parameters, ParameterError> {
        self.tool.validate_parameters(&self.schema, params)
    }

    pub async fn execute(
        &self,
        caller_id: CallerId,
        params: &Parameters,
        context: &ExecutionContext,
    ) -> anyhow::Result<ToolResult> {
        self.tool.execute(caller_id, params, context).await
    }
}

impl fmt::Debug for ToolHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolHandle")
            .field("name", &self.metadata.name)
            .field("aliases", &self.metadata.aliases)
            .finish_non_exhaustive()
    }
}

fn validate_metadata(metadata: &ToolMetadata) -> Result<(), ToolError> {
    let name = metadata.name.trim();
    if name.is_empty() {
        return Err(ToolError::malformed("<unnamed>", "tool name cannot be empty"));
    }
    if metadata.aliases.is_empty() {
        return Err(ToolError::malformed(name, "tool must declare at least one alias"));
    }

    let mut seen = HashSet::new();
    for alias in &metadata.aliases {
        if alias.trim().is_empty() {
            return Err(ToolError::malformed(name, "aliases cannot be empty"));
        }
        if !seen.insert(alias.as_str()) {
            return Err(ToolError::malformed(name, format!("alias '{alias}' is declared twice")));
        }
    }

    Ok(())
}

fn compile_descriptors(tool: &str, parameters: Vec<ToolParameter>) -> Result<ParameterSchema, ToolError> {
    let mut seen = HashSet::new();
    for param in &parameters {
        if param.name.trim().is_empty() {
            return Err(ToolError::malformed(tool, "parameter names cannot be empty"));
        }
        if !seen.insert(param.name.as_str()) {
            return Err(ToolError::malformed(
                tool,
                format!("parameter '{}' is declared twice", param.name),
            ));
        }
    }

    let schema =
        ParameterSchema::compile(parameters).map_err(|e| ToolError::malformed(tool, e.to_string()))?;

    for param in schema.descriptors() {
        if let Some(ref default) = param.default {
            schema.check(param, default).map_err(|e| {
                ToolError::malformed(tool, format!("default for '{}' is invalid: {e}", param.name))
            })?;
        }
    }
    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::ParameterType;
    use serde_json::json;

    struct ReportTool {
        metadata: ToolMetadata,
        parameters: Vec<ToolParameter>,
    }

    impl ReportTool {
        fn new() -> Self {
            Self {
                metadata: ToolMetadata::new("report", "Sales report", ToolCategory::Analytics)
                    .with_alias("/report")
                    .with_permission("/report"),
                parameters: vec![
                    ToolParameter::new("from", ParameterType::Integer, "first year"),
                    ToolParameter::new("to", ParameterType::Integer, "last year"),
                    ToolParameter::new("format", ParameterType::String, "output format")
                        .optional()
                        .with_default(json!("table"))
                        .with_allowed_values(vec![json!("table"), json!("chart")]),
                ],
            }
        }
    }

    #[async_trait]
    impl Tool for ReportTool {
        fn metadata(&self) -> ToolMetadata {
            self.metadata.clone()
        }

        fn parameters(&self) -> Vec<ToolParameter> {
            self.parameters.clone()
        }

        async fn execute(
            &self,
            _caller_id: CallerId,
            _params: &Parameters,
            _context: &ExecutionContext,
        ) -> anyhow::Result<ToolResult> {
            Ok(ToolResult::success("report"))
        }

        fn validate_parameters(
            &self,
            schema: &ParameterSchema,
            params: Parameters,
        ) -> Result<Parameters, ParameterError> {
            let params = schema.validate(params)?;
            let from = params.get("from").and_then(|v| v.as_i64());
            let to = params.get("to").and_then(|v| v.as_i64());
            if let (Some(from), Some(to)) = (from, to) {
                if from > to {
                    return Err(ParameterError::Invalid(
                        "parameter 'from' must not be after 'to'".to_string(),
                    ));
                }
            }
            Ok(params)
        }
    }

    fn params(value: serde_json::Value) -> Parameters {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_defaults_fill_missing_optional() {
        let handle = ToolHandle::new(ReportTool::new()).unwrap();
        let validated = handle
            .validate_parameters(params(json!({"from": 2020, "to": 2021})))
            .unwrap();
        assert_eq!(validated.get("format"), Some(&json!("table")));
    }

    #[test]
    fn test_missing_required_rejected() {
        let handle = ToolHandle::new(ReportTool::new()).unwrap();
        let err = handle.validate_parameters(params(json!({"from": 2020}))).unwrap_err();
        assert_eq!(err, ParameterError::Missing("to".to_string()));
    }

    #[test]
    fn test_cross_field_override_applies_through_handle() {
        let handle = ToolHandle::new(ReportTool::new()).unwrap();
        let err = handle
            .validate_parameters(params(json!({"from": 2022, "to": 2021})))
            .unwrap_err();
        assert!(err.to_string().contains("'from' must not be after 'to'"));
    }

    #[test]
    fn test_unknown_parameters_pass_through() {
        let validated = ParameterSchema::default()
            .validate(params(json!({"extra": [1, 2]})))
            .unwrap();
        assert_eq!(validated.get("extra"), Some(&json!([1, 2])));
    }

    #[test]
    fn test_required_with_default_is_filled() {
        let descriptors = vec![
            ToolParameter::new("limit", ParameterType::Integer, "rows").with_default(json!(10)),
        ];
        let validated = ParameterSchema::compile(descriptors)
            .unwrap()
            .validate(Parameters::new())
            .unwrap();
        assert_eq!(validated.get("limit"), Some(&json!(10)));
    }

    #[test]
    fn test_empty_aliases_are_malformed() {
        let mut tool = ReportTool::new();
        tool.metadata.aliases.clear();
        let err = ToolHandle::new(tool).unwrap_err();
        assert!(matches!(err, ToolError::MalformedTool { .. }));
        assert!(err.to_string().contains("at least one alias"));
    }

    #[test]
    fn test_empty_name_is_malformed() {
        let mut tool = ReportTool::new();
        tool.metadata.name = "  ".to_string();
        assert!(ToolHandle::new(tool).is_err());
    }

    #[test]
    fn test_invalid_default_is_malformed() {
        let mut tool = ReportTool::new();
        tool.parameters.push(
            ToolParameter::new("query", ParameterType::String, "q")
                .with_min_length(3)
                .with_default(json!("ab")),
        );
        let err = ToolHandle::new(tool).unwrap_err();
        assert!(err.to_string().contains("default for 'query' is invalid"));
    }

    #[test]
    fn test_duplicate_parameter_is_malformed() {
        let mut tool = ReportTool::new();
        tool.parameters
            .push(ToolParameter::new("from", ParameterType::Integer, "again"));
        assert!(ToolHandle::new(tool).is_err());
    }

    #[test]
    fn test_bad_pattern_is_malformed() {
        let mut tool = ReportTool::new();
        tool.parameters
            .push(ToolParameter::new("code", ParameterType::String, "code").with_pattern("(["));
        let err = ToolHandle::new(tool).unwrap_err();
        assert!(err.to_string().contains("invalid pattern"));
    }

    #[test]
    fn test_handle_compiles_patterns_once() {
        let mut tool = ReportTool::new();
        tool.parameters.push(
            ToolParameter::new("code", ParameterType::String, "code")
                .optional()
                .with_pattern("^[A-Z]{3}$"),
        );
        let handle = ToolHandle::new(tool).unwrap();

        assert_eq!(handle.schema().pattern("code").map(Regex::as_str), Some("^[A-Z]{3}$"));
        assert!(handle.schema().pattern("from").is_none());

        let base = json!({"from": 2020, "to": 2021});
        let mut ok = base.clone();
        ok["code"] = json!("ABC");
        assert!(handle.validate_parameters(params(ok)).is_ok());

        let mut bad = base;
        bad["code"] = json!("abc");
        assert!(matches!(
            handle.validate_parameters(params(bad)),
            Err(ParameterError::PatternMismatch { ref name, .. }) if name == "code"
        ));
    }

    #[test]
    fn test_handle_caches_descriptors() {
        let handle = ToolHandle::new(ReportTool::new()).unwrap();
        assert_eq!(handle.name(), "report");
        assert_eq!(handle.aliases(), ["/report".to_string()]);
        assert_eq!(handle.parameters().len(), 3);
        assert_eq!(handle.category(), ToolCategory::Analytics);
        assert!(handle.requires_auth());
    }
}
