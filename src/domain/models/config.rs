use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure for Amber
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Dispatch pipeline configuration
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,

    /// Audit sink configuration
    #[serde(default)]
    pub audit: AuditConfig,

    /// Static identity table used by the config-backed identity and
    /// permission stores
    #[serde(default)]
    pub identities: Vec<IdentityEntry>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stdout only when unset
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// File rotation: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}

/// What the pipeline does when a policy collaborator is not wired in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyMode {
    /// Missing identity/permission service means the check does not apply.
    #[default]
    Permissive,
    /// Missing identity/permission service denies the invocation.
    Strict,
}

/// Dispatch pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct OrchestratorConfig {
    #[serde(default)]
    pub policy_mode: PolicyMode,

    /// Upper bound on a single tool execution; unbounded when unset
    #[serde(default)]
    pub execution_timeout_ms: Option<u64>,

    /// Maximum characters of internal error text kept in audit records
    #[serde(default = "default_audit_error_max_chars")]
    pub audit_error_max_chars: usize,
}

const fn default_audit_error_max_chars() -> usize {
    200
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            policy_mode: PolicyMode::default(),
            execution_timeout_ms: None,
            audit_error_max_chars: default_audit_error_max_chars(),
        }
    }
}

/// Where audit records go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// One structured log line per record.
    #[default]
    Tracing,
    /// Bounded in-memory buffer.
    Memory,
    /// Append-only JSON lines file.
    File,
}

/// Audit sink configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AuditConfig {
    #[serde(default)]
    pub sink: AuditSinkKind,

    /// JSON lines file used by the `file` sink
    #[serde(default = "default_audit_path")]
    pub path: PathBuf,

    /// Capacity of the `memory` sink
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

fn default_audit_path() -> PathBuf {
    PathBuf::from(".amber/audit.jsonl")
}

const fn default_max_entries() -> usize {
    10_000
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            sink: AuditSinkKind::default(),
            path: default_audit_path(),
            max_entries: default_max_entries(),
        }
    }
}

/// One caller known to the static identity store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct IdentityEntry {
    pub caller_id: i64,
    pub internal_id: i64,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub display_name: Option<String>,
    /// Permission strings granted to this caller
    #[serde(default)]
    pub permissions: Vec<String>,
}

const fn default_true() -> bool {
    true
}
