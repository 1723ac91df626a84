//! Dispatch pipeline.
//!
//! Every invocation runs the same ordered stages:
//!
//! 1. Resolve the tool by alias
//! 2. Authenticate the caller (tools with `requires_auth`)
//! 3. Authorize each required permission, in declaration order
//! 4. Validate parameters
//! 5. Execute, converting errors, panics and timeouts to `ExecutionError`
//! 6. Stamp the duration and write an audit record
//!
//! A failing stage short-circuits the rest. Stages 1-4 produce a rejection
//! without executing or auditing; stage 6 can never change the result.
//!
//! Callers may wrap `execute_command` in their own timeout. An invocation
//! dropped during stage 5 is counted as a failed execution and still
//! produces an `ExecutionError` audit record.

use futures::FutureExt;
use serde::Serialize;
use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, warn};

use crate::domain::errors::{ServiceError, ToolErrorKind};
use crate::domain::models::{
    AuditRecord, CallerId, Identity, OrchestratorConfig, Parameters, PolicyMode, ToolResult,
    DEFAULT_USER_ERROR,
};
use crate::domain::ports::AuditSink;
use crate::infrastructure::logging::SecretScrubber;
use crate::services::audit_log::TracingAuditSink;
use crate::services::execution_context::ExecutionContext;
use crate::services::registry::ToolRegistry;
use crate::services::tool::ToolHandle;

const REGISTER_FIRST: &str = "You must register first. Use /register";
const ACCOUNT_INACTIVE: &str = "Your account is inactive. Contact the administrator";
const IDENTITY_UNAVAILABLE: &str = "Could not verify your identity right now";
const PERMISSIONS_UNAVAILABLE: &str = "Could not verify your permissions right now";
const EXECUTION_TIMED_OUT: &str = "The command took too long to complete";
const CANCELLED: &str = "Invocation cancelled before the tool completed";

/// Running totals and registry size.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrchestratorStats {
    /// Invocations that reached the execute stage.
    pub total_executions: u64,
    /// Executed invocations that failed.
    pub total_errors: u64,
    /// Invocations rejected before execution.
    pub total_rejections: u64,
    /// Percentage of executed invocations that succeeded.
    pub success_rate: f64,
    pub registered_tools: usize,
    pub registered_aliases: usize,
}

/// Why an invocation stopped before the execute stage.
struct Rejection {
    kind: ToolErrorKind,
    error: String,
    user_error: String,
}

impl Rejection {
    fn new(kind: ToolErrorKind, error: impl Into<String>, user_error: impl Into<String>) -> Self {
        Self {
            kind,
            error: error.into(),
            user_error: user_error.into(),
        }
    }
}

/// Runs invocations through the dispatch pipeline.
pub struct ToolOrchestrator {
    registry: Arc<ToolRegistry>,
    audit_sink: Arc<dyn AuditSink>,
    config: OrchestratorConfig,
    scrubber: SecretScrubber,
    total_executions: AtomicU64,
    total_errors: AtomicU64,
    total_rejections: AtomicU64,
}

impl ToolOrchestrator {
    /// Orchestrator with default settings, auditing to the log.
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        info!(tools = registry.len(), "ToolOrchestrator initialized");
        Self {
            registry,
            audit_sink: Arc::new(TracingAuditSink),
            config: OrchestratorConfig::default(),
            scrubber: SecretScrubber::new(),
            total_executions: AtomicU64::new(0),
            total_errors: AtomicU64::new(0),
            total_rejections: AtomicU64::new(0),
        }
    }

    pub fn with_audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit_sink = sink;
        self
    }

    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Run one invocation addressed by alias.
    ///
    /// Never fails: every stage failure is returned as a failed
    /// [`ToolResult`] tagged with its [`ToolErrorKind`].
    #[instrument(skip(self, params, context))]
    pub async fn execute_command(
        &self,
        caller_id: CallerId,
        alias: &str,
        params: Parameters,
        context: &ExecutionContext,
    ) -> ToolResult {
        let started = Instant::now();

        let Some(tool) = self.registry.lookup_by_alias(alias) else {
            return self.reject(Rejection::new(
                ToolErrorKind::CommandNotFound,
                format!("No tool registered for alias '{alias}'"),
                format!("The command {alias} does not exist"),
            ));
        };

        debug!(tool = %tool.name(), "Tool resolved");

        let mut guard = CancelGuard {
            orchestrator: self,
            tool: &tool,
            caller_id,
            alias,
            started,
            stage: Stage::Policy,
        };

        let params = match self.check_policies(&tool, caller_id, params, context).await {
            Ok(params) => params,
            Err(rejection) => {
                guard.stage = Stage::Done;
                return self.reject(rejection);
            }
        };

        guard.stage = Stage::Execute;
        let mut result = self.run_tool(&tool, caller_id, &params, context).await;
        guard.stage = Stage::Audit;

        self.total_executions.fetch_add(1, Ordering::Relaxed);
        let elapsed = started.elapsed();
        result.stamp(elapsed);

        if result.is_success() {
            info!(
                tool = %tool.name(),
                duration_ms = elapsed.as_secs_f64() * 1000.0,
                "Tool executed successfully"
            );
        } else {
            self.total_errors.fetch_add(1, Ordering::Relaxed);
            warn!(
                tool = %tool.name(),
                kind = ?result.error_kind(),
                error = result.error_message().unwrap_or_default(),
                "Tool execution failed"
            );
        }

        self.audit(caller_id, &tool, alias, &result).await;
        guard.stage = Stage::Done;

        result
    }

    /// Run a tool addressed by name, through its primary alias.
    #[instrument(skip(self, params, context))]
    pub async fn execute_by_name(
        &self,
        caller_id: CallerId,
        name: &str,
        params: Parameters,
        context: &ExecutionContext,
    ) -> ToolResult {
        let alias = self
            .registry
            .lookup_by_name(name)
            .and_then(|tool| tool.metadata().primary_alias().map(str::to_string));

        match alias {
            Some(alias) => self.execute_command(caller_id, &alias, params, context).await,
            None => self.reject(Rejection::new(
                ToolErrorKind::CommandNotFound,
                format!("No tool named '{name}'"),
                format!("The tool '{name}' does not exist"),
            )),
        }
    }

    pub fn stats(&self) -> OrchestratorStats {
        let total_executions = self.total_executions.load(Ordering::Relaxed);
        let total_errors = self.total_errors.load(Ordering::Relaxed);
        let success_rate = if total_executions > 0 {
            total_executions.saturating_sub(total_errors) as f64 / total_executions as f64 * 100.0
        } else {
            0.0
        };

        OrchestratorStats {
            total_executions,
            total_errors,
            total_rejections: self.total_rejections.load(Ordering::Relaxed),
            success_rate,
            registered_tools: self.registry.len(),
            registered_aliases: self.registry.alias_list().len(),
        }
    }

    /// Stages 2 to 4. Returns the validated parameters.
    async fn check_policies(
        &self,
        tool: &ToolHandle,
        caller_id: CallerId,
        params: Parameters,
        context: &ExecutionContext,
    ) -> Result<Parameters, Rejection> {
        let identity = if tool.requires_auth() {
            self.authenticate(caller_id, context).await?
        } else {
            None
        };

        if !tool.required_permissions().is_empty() {
            self.authorize(tool, caller_id, identity, context).await?;
        }

        tool.validate_parameters(params).map_err(|e| {
            Rejection::new(
                ToolErrorKind::ValidationError,
                e.to_string(),
                format!("Invalid parameters: {e}"),
            )
        })
    }

    /// Returns the caller's identity, or `None` when no identity service is
    /// wired in and the policy is permissive.
    async fn authenticate(
        &self,
        caller_id: CallerId,
        context: &ExecutionContext,
    ) -> Result<Option<Identity>, Rejection> {
        let Some(identities) = context.identity_service() else {
            return match self.config.policy_mode {
                PolicyMode::Permissive => {
                    warn!(caller_id, "No identity service in context, skipping authentication");
                    Ok(None)
                }
                PolicyMode::Strict => Err(Rejection::new(
                    ToolErrorKind::AuthenticationRequired,
                    "No identity service configured",
                    IDENTITY_UNAVAILABLE,
                )),
            };
        };

        let lookup_failed = |e: ServiceError| {
            Rejection::new(
                ToolErrorKind::AuthenticationRequired,
                format!("Identity lookup failed: {e}"),
                IDENTITY_UNAVAILABLE,
            )
        };

        if !identities.is_registered(caller_id).await.map_err(lookup_failed)? {
            return Err(Rejection::new(
                ToolErrorKind::AuthenticationRequired,
                format!("Caller {caller_id} is not registered"),
                REGISTER_FIRST,
            ));
        }

        match identities.get(caller_id).await.map_err(lookup_failed)? {
            Some(identity) if identity.is_active => Ok(Some(identity)),
            Some(_) => Err(Rejection::new(
                ToolErrorKind::AuthenticationRequired,
                format!("Caller {caller_id} is inactive"),
                ACCOUNT_INACTIVE,
            )),
            None => Err(Rejection::new(
                ToolErrorKind::AuthenticationRequired,
                format!("Caller {caller_id} is registered but has no identity"),
                IDENTITY_UNAVAILABLE,
            )),
        }
    }

    async fn authorize(
        &self,
        tool: &ToolHandle,
        caller_id: CallerId,
        identity: Option<Identity>,
        context: &ExecutionContext,
    ) -> Result<(), Rejection> {
        let strict = self.config.policy_mode == PolicyMode::Strict;

        let Some(permissions) = context.permission_service() else {
            if strict {
                return Err(Rejection::new(
                    ToolErrorKind::PermissionDenied,
                    "No permission service configured",
                    PERMISSIONS_UNAVAILABLE,
                ));
            }
            warn!(caller_id, tool = %tool.name(), "No permission service in context, skipping authorization");
            return Ok(());
        };

        let identity = match identity {
            Some(identity) => Some(identity),
            None => match context.identity_service() {
                Some(identities) => identities.get(caller_id).await.map_err(|e| {
                    Rejection::new(
                        ToolErrorKind::PermissionDenied,
                        format!("Identity lookup failed: {e}"),
                        PERMISSIONS_UNAVAILABLE,
                    )
                })?,
                None if strict => {
                    return Err(Rejection::new(
                        ToolErrorKind::PermissionDenied,
                        "No identity service configured",
                        PERMISSIONS_UNAVAILABLE,
                    ))
                }
                None => {
                    warn!(caller_id, "No identity service in context, skipping authorization");
                    return Ok(());
                }
            },
        };

        let Some(identity) = identity else {
            return Err(Rejection::new(
                ToolErrorKind::PermissionDenied,
                format!("Caller {caller_id} has no identity"),
                "Could not verify your permissions",
            ));
        };

        for permission in tool.required_permissions() {
            let decision = permissions
                .check(identity.internal_id, permission)
                .await
                .map_err(|e| {
                    Rejection::new(
                        ToolErrorKind::PermissionDenied,
                        format!("Permission lookup for '{permission}' failed: {e}"),
                        PERMISSIONS_UNAVAILABLE,
                    )
                })?;

            if !decision.allowed {
                return Err(Rejection::new(
                    ToolErrorKind::PermissionDenied,
                    format!("Caller {caller_id} lacks permission '{permission}'"),
                    decision.reason,
                ));
            }
        }

        Ok(())
    }

    /// Stage 5. Errors, panics and timeouts become `ExecutionError`.
    async fn run_tool(
        &self,
        tool: &ToolHandle,
        caller_id: CallerId,
        params: &Parameters,
        context: &ExecutionContext,
    ) -> ToolResult {
        let execution = AssertUnwindSafe(tool.execute(caller_id, params, context)).catch_unwind();

        let outcome = match self.config.execution_timeout_ms {
            Some(limit_ms) => {
                let limit = Duration::from_millis(limit_ms);
                match tokio::time::timeout(limit, execution).await {
                    Ok(outcome) => outcome,
                    Err(_) => {
                        error!(tool = %tool.name(), limit_ms, "Tool execution timed out");
                        return ToolResult::failure(
                            format!("Tool '{}' timed out after {limit_ms}ms", tool.name()),
                            Some(EXECUTION_TIMED_OUT.to_string()),
                        );
                    }
                }
            }
            None => execution.await,
        };

        match outcome {
            Ok(Ok(result)) => {
                if let Some(kind) = result
                    .error_kind()
                    .filter(|kind| *kind != ToolErrorKind::ExecutionError)
                {
                    warn!(tool = %tool.name(), %kind, "Tool returned a pipeline error kind, recording it as ExecutionError");
                }
                result.into_execution_failure()
            }
            Ok(Err(e)) => {
                error!(tool = %tool.name(), error = %format!("{e:#}"), "Tool returned an error");
                ToolResult::failure(format!("{e:#}"), Some(DEFAULT_USER_ERROR.to_string()))
            }
            Err(payload) => {
                let detail = panic_detail(payload.as_ref());
                error!(tool = %tool.name(), panic = %detail, "Tool panicked");
                ToolResult::failure(
                    format!("Tool '{}' panicked: {detail}", tool.name()),
                    Some(DEFAULT_USER_ERROR.to_string()),
                )
            }
        }
    }

    /// Stage 6. Failures are logged and swallowed.
    async fn audit(&self, caller_id: CallerId, tool: &ToolHandle, alias: &str, result: &ToolResult) {
        let duration_ms = result
            .execution_time()
            .map(|d| d.as_secs_f64() * 1000.0)
            .unwrap_or_default();
        let mut record = AuditRecord::new(caller_id, tool.name(), alias).with_duration_ms(duration_ms);
        if let (Some(kind), Some(error)) = (result.error_kind(), result.error_message()) {
            let error = self
                .scrubber
                .scrub_truncated(error, self.config.audit_error_max_chars);
            record = record.with_failure(kind, error);
        }

        let write = AssertUnwindSafe(self.audit_sink.record(&record)).catch_unwind();
        match write.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(
                kind = %ToolErrorKind::AuditFailure,
                record_id = %record.id,
                error = %e,
                "Audit record could not be written"
            ),
            Err(payload) => warn!(
                kind = %ToolErrorKind::AuditFailure,
                record_id = %record.id,
                panic = %panic_detail(payload.as_ref()),
                "Audit sink panicked"
            ),
        }
    }

    fn reject(&self, rejection: Rejection) -> ToolResult {
        self.total_rejections.fetch_add(1, Ordering::Relaxed);
        info!(kind = %rejection.kind, reason = %rejection.error, "Invocation rejected");
        ToolResult::error(rejection.kind, rejection.error, Some(rejection.user_error))
    }
}

impl fmt::Debug for ToolOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolOrchestrator")
            .field("executions", &self.total_executions.load(Ordering::Relaxed))
            .field("errors", &self.total_errors.load(Ordering::Relaxed))
            .field("policy_mode", &self.config.policy_mode)
            .finish_non_exhaustive()
    }
}

/// Where an in-flight invocation is, for [`CancelGuard`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Policy,
    Execute,
    Audit,
    Done,
}

/// Accounts for an invocation whose future is dropped before it finishes.
struct CancelGuard<'a> {
    orchestrator: &'a ToolOrchestrator,
    tool: &'a ToolHandle,
    caller_id: CallerId,
    alias: &'a str,
    started: Instant,
    stage: Stage,
}

impl Drop for CancelGuard<'_> {
    fn drop(&mut self) {
        let elapsed_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        match self.stage {
            Stage::Done => {}
            Stage::Policy => {
                info!(
                    caller_id = self.caller_id,
                    tool = %self.tool.name(),
                    alias = self.alias,
                    duration_ms = elapsed_ms,
                    "Invocation cancelled before execution"
                );
            }
            Stage::Audit => {
                warn!(
                    kind = %ToolErrorKind::AuditFailure,
                    caller_id = self.caller_id,
                    tool = %self.tool.name(),
                    alias = self.alias,
                    "Invocation cancelled while writing its audit record"
                );
            }
            Stage::Execute => {
                let orchestrator = self.orchestrator;
                orchestrator.total_executions.fetch_add(1, Ordering::Relaxed);
                orchestrator.total_errors.fetch_add(1, Ordering::Relaxed);

                let record = AuditRecord::new(self.caller_id, self.tool.name(), self.alias)
                    .with_duration_ms(elapsed_ms)
                    .with_failure(ToolErrorKind::ExecutionError, CANCELLED);

                warn!(
                    kind = %ToolErrorKind::ExecutionError,
                    caller_id = self.caller_id,
                    tool = %self.tool.name(),
                    alias = self.alias,
                    duration_ms = elapsed_ms,
                    record_id = %record.id,
                    "Invocation cancelled during execution"
                );

                // Drop cannot await, so the sink write runs as its own task
                // when a runtime is still around.
                if let Ok(runtime) = tokio::runtime::Handle::try_current() {
                    let sink = Arc::clone(&orchestrator.audit_sink);
                    runtime.spawn(async move {
                        if let Err(e) = sink.record(&record).await {
                            warn!(
                                kind = %ToolErrorKind::AuditFailure,
                                record_id = %record.id,
                                error = %e,
                                "Audit record could not be written"
                            );
                        }
                    });
                }
            }
        }
    }
}

fn panic_detail(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{ParameterType, PermissionDecision, ToolCategory, ToolMetadata, ToolParameter};
    use crate::domain::ports::{IdentityService, PermissionService};
    use crate::services::tool::Tool;
    use async_trait::async_trait;
    use serde_json::json;

    struct SleepyTool;

    #[async_trait]
    impl Tool for SleepyTool {
        fn metadata(&self) -> ToolMetadata {
            ToolMetadata::new("sleepy", "Sleeps", ToolCategory::Utility)
                .with_alias("/sleepy")
                .with_auth(false)
        }

        async fn execute(
            &self,
            _caller_id: CallerId,
            _params: &Parameters,
            _context: &ExecutionContext,
        ) -> anyhow::Result<ToolResult> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(ToolResult::success("awake"))
        }
    }

    struct GuardedTool;

    #[async_trait]
    impl Tool for GuardedTool {
        fn metadata(&self) -> ToolMetadata {
            ToolMetadata::new("guarded", "Needs /admin", ToolCategory::System)
                .with_alias("/guarded")
                .with_permission("/admin")
        }

        fn parameters(&self) -> Vec<ToolParameter> {
            vec![ToolParameter::new("target", ParameterType::String, "target").with_min_length(1)]
        }

        async fn execute(
            &self,
            _caller_id: CallerId,
            _params: &Parameters,
            _context: &ExecutionContext,
        ) -> anyhow::Result<ToolResult> {
            Ok(ToolResult::success("done"))
        }
    }

    struct ForgingTool;

    #[async_trait]
    impl Tool for ForgingTool {
        fn metadata(&self) -> ToolMetadata {
            ToolMetadata::new("forging", "Claims a pipeline error", ToolCategory::Utility)
                .with_alias("/forging")
                .with_auth(false)
        }

        async fn execute(
            &self,
            _caller_id: CallerId,
            _params: &Parameters,
            _context: &ExecutionContext,
        ) -> anyhow::Result<ToolResult> {
            Ok(ToolResult::error(
                ToolErrorKind::PermissionDenied,
                "report store refused the query",
                Some("Reports are offline".to_string()),
            ))
        }
    }

    struct FailingIdentity;

    #[async_trait]
    impl IdentityService for FailingIdentity {
        async fn is_registered(&self, _caller_id: CallerId) -> Result<bool, ServiceError> {
            Err(ServiceError::Unavailable("user store offline".to_string()))
        }

        async fn get(&self, _caller_id: CallerId) -> Result<Option<Identity>, ServiceError> {
            Err(ServiceError::Unavailable("user store offline".to_string()))
        }
    }

    struct AllowAll;

    #[async_trait]
    impl PermissionService for AllowAll {
        async fn check(&self, _internal_id: i64, _permission: &str) -> Result<PermissionDecision, ServiceError> {
            Ok(PermissionDecision::allow())
        }
    }

    fn orchestrator(config: OrchestratorConfig) -> ToolOrchestrator {
        let mut registry = ToolRegistry::new();
        registry.register_tool(SleepyTool).unwrap();
        registry.register_tool(GuardedTool).unwrap();
        registry.register_tool(ForgingTool).unwrap();
        ToolOrchestrator::new(Arc::new(registry)).with_config(config)
    }

    fn target() -> Parameters {
        serde_json::from_value(json!({"target": "db"})).unwrap()
    }

    #[tokio::test]
    async fn test_permissive_mode_skips_missing_services() {
        let orchestrator = orchestrator(OrchestratorConfig::default());
        let context = ExecutionContext::builder().build();

        let result = orchestrator.execute_command(7, "/guarded", target(), &context).await;

        assert!(result.is_success());
        assert_eq!(orchestrator.stats().total_executions, 1);
    }

    #[tokio::test]
    async fn test_strict_mode_denies_without_identity_service() {
        let orchestrator = orchestrator(OrchestratorConfig {
            policy_mode: PolicyMode::Strict,
            ..OrchestratorConfig::default()
        });
        let context = ExecutionContext::builder()
            .with_permission_service(Arc::new(AllowAll))
            .build();

        let result = orchestrator.execute_command(7, "/guarded", target(), &context).await;

        assert_eq!(result.error_kind(), Some(ToolErrorKind::AuthenticationRequired));
        assert_eq!(orchestrator.stats().total_rejections, 1);
        assert_eq!(orchestrator.stats().total_executions, 0);
    }

    #[tokio::test]
    async fn test_identity_lookup_error_fails_closed() {
        let orchestrator = orchestrator(OrchestratorConfig::default());
        let context = ExecutionContext::builder()
            .with_identity_service(Arc::new(FailingIdentity))
            .with_permission_service(Arc::new(AllowAll))
            .build();

        let result = orchestrator.execute_command(7, "/guarded", target(), &context).await;

        assert_eq!(result.error_kind(), Some(ToolErrorKind::AuthenticationRequired));
        assert_eq!(result.user_error(), Some(IDENTITY_UNAVAILABLE));
        assert!(result.error_message().unwrap().contains("user store offline"));
    }

    #[tokio::test]
    async fn test_timeout_becomes_execution_error() {
        let orchestrator = orchestrator(OrchestratorConfig {
            execution_timeout_ms: Some(20),
            ..OrchestratorConfig::default()
        });
        let context = ExecutionContext::builder().build();

        let result = orchestrator
            .execute_command(7, "/sleepy", Parameters::new(), &context)
            .await;

        assert_eq!(result.error_kind(), Some(ToolErrorKind::ExecutionError));
        assert_eq!(result.user_error(), Some(EXECUTION_TIMED_OUT));
        assert!(result.execution_time().is_some());
        assert_eq!(orchestrator.stats().total_errors, 1);
    }

    #[tokio::test]
    async fn test_tool_failures_are_execution_errors() {
        let orchestrator = orchestrator(OrchestratorConfig::default());
        let context = ExecutionContext::builder().build();

        let result = orchestrator
            .execute_command(7, "/forging", Parameters::new(), &context)
            .await;

        assert_eq!(result.error_kind(), Some(ToolErrorKind::ExecutionError));
        assert_eq!(result.user_error(), Some("Reports are offline"));
        assert_eq!(result.error_message(), Some("report store refused the query"));
        let stats = orchestrator.stats();
        assert_eq!(stats.total_errors, 1);
        assert_eq!(stats.total_rejections, 0);
    }

    #[tokio::test]
    async fn test_execute_by_name_unknown() {
        let orchestrator = orchestrator(OrchestratorConfig::default());
        let context = ExecutionContext::builder().build();

        let result = orchestrator
            .execute_by_name(7, "missing", Parameters::new(), &context)
            .await;

        assert_eq!(result.error_kind(), Some(ToolErrorKind::CommandNotFound));
        assert!(result.execution_time().is_none());
    }

    #[test]
    fn test_stats_start_at_zero() {
        let stats = orchestrator(OrchestratorConfig::default()).stats();

        assert_eq!(stats.total_executions, 0);
        assert_eq!(stats.success_rate, 0.0);
        assert_eq!(stats.registered_tools, 3);
        assert_eq!(stats.registered_aliases, 3);
    }

    #[test]
    fn test_panic_detail() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_detail(payload.as_ref()), "boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_detail(payload.as_ref()), "bang");
    }
}
