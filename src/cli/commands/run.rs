//! Run one command through the dispatch pipeline.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use super::builtin_registry;
use crate::cli::output::{output, CommandOutput};
use crate::domain::errors::ToolErrorKind;
use crate::domain::models::Parameters;
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::{StaticIdentityStore, StaticPermissionStore};
use crate::services::{
    audit_sink_from_config, tool_summary, ExecutionContext, ToolOrchestrator,
    TOOL_CATALOG_SERVICE,
};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Command alias, e.g. /help
    pub alias: String,

    /// Caller id the command runs as
    #[arg(short, long, default_value_t = 0)]
    pub caller: i64,

    /// Parameter as key=value; values that parse as JSON are used as JSON
    #[arg(short, long)]
    pub param: Vec<String>,

    /// All parameters as one JSON object; --param entries override its keys
    #[arg(long)]
    pub params_json: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RunOutput {
    pub alias: String,
    pub caller_id: i64,
    pub success: bool,
    pub data: Option<Value>,
    pub error_kind: Option<ToolErrorKind>,
    pub user_error: Option<String>,
    pub execution_time_ms: Option<f64>,
}

impl CommandOutput for RunOutput {
    fn to_human(&self) -> String {
        if self.success {
            match &self.data {
                Some(Value::String(text)) => text.clone(),
                Some(other) => serde_json::to_string_pretty(other).unwrap_or_default(),
                None => String::new(),
            }
        } else {
            format!(
                "{} ({})",
                self.user_error.as_deref().unwrap_or_default(),
                self.error_kind.map(|k| k.as_str()).unwrap_or_default()
            )
        }
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Parse `key=value` pairs on top of an optional JSON object.
pub fn parse_params(pairs: &[String], params_json: Option<&str>) -> Result<Parameters> {
    let mut params: Parameters = match params_json {
        Some(raw) => serde_json::from_str(raw).context("--params-json must be a JSON object")?,
        None => Parameters::new(),
    };

    for pair in pairs {
        let (key, raw) = pair
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("Invalid parameter '{pair}', expected key=value"))?;
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        params.insert(key.trim().to_string(), value);
    }

    Ok(params)
}

pub async fn execute(args: RunArgs, json_mode: bool) -> Result<()> {
    let config = ConfigLoader::load().context("Failed to load configuration")?;
    let registry = builtin_registry()?;
    let params = parse_params(&args.param, args.params_json.as_deref())?;

    let audit_sink = audit_sink_from_config(&config.audit)
        .await
        .context("Failed to open audit sink")?;

    let context = ExecutionContext::builder()
        .with_identity_service(Arc::new(StaticIdentityStore::from_entries(&config.identities)))
        .with_permission_service(Arc::new(StaticPermissionStore::from_entries(
            &config.identities,
        )))
        .with_named_service(TOOL_CATALOG_SERVICE, Arc::new(tool_summary(&registry)))
        .build();

    let orchestrator = ToolOrchestrator::new(registry)
        .with_config(config.orchestrator.clone())
        .with_audit_sink(audit_sink);

    let result = orchestrator
        .execute_command(args.caller, &args.alias, params, &context)
        .await;

    let out = RunOutput {
        alias: args.alias,
        caller_id: args.caller,
        success: result.is_success(),
        data: result.data().cloned(),
        error_kind: result.error_kind(),
        user_error: result.user_error().map(str::to_string),
        execution_time_ms: result.execution_time().map(|d| d.as_secs_f64() * 1000.0),
    };
    output(&out, json_mode);

    Ok(())
}
