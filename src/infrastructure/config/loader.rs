use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidRotation(String),

    #[error("Invalid execution_timeout_ms: {0}. Must be at least 1")]
    InvalidTimeout(u64),

    #[error("Invalid audit_error_max_chars: {0}. Must be at least 1")]
    InvalidAuditErrorMaxChars(usize),

    #[error("Invalid audit max_entries: {0}. Must be at least 1")]
    InvalidMaxEntries(usize),

    #[error("Audit file path cannot be empty")]
    EmptyAuditPath,

    #[error("Caller {0} appears more than once in identities")]
    DuplicateIdentity(i64),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .amber/config.yaml (project config)
    /// 3. .amber/local.yaml (local overrides, optional)
    /// 4. Environment variables (AMBER_* prefix, `__` for nesting)
    pub fn load() -> Result<Config> {
        Self::load_from_dir(".")
    }

    /// Same as [`ConfigLoader::load`], rooted at `dir` instead of the working directory
    pub fn load_from_dir(dir: impl AsRef<Path>) -> Result<Config> {
        let amber_dir = dir.as_ref().join(".amber");
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(amber_dir.join("config.yaml")))
            .merge(Yaml::file(amber_dir.join("local.yaml")))
            .merge(Env::prefixed("AMBER_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.as_ref().display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidRotation(config.logging.rotation.clone()));
        }

        if config.orchestrator.execution_timeout_ms == Some(0) {
            return Err(ConfigError::InvalidTimeout(0));
        }

        if config.orchestrator.audit_error_max_chars == 0 {
            return Err(ConfigError::InvalidAuditErrorMaxChars(0));
        }

        if config.audit.max_entries == 0 {
            return Err(ConfigError::InvalidMaxEntries(0));
        }

        if config.audit.path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyAuditPath);
        }

        let mut seen = HashSet::new();
        for identity in &config.identities {
            if !seen.insert(identity.caller_id) {
                return Err(ConfigError::DuplicateIdentity(identity.caller_id));
            }
            if identity.permissions.iter().any(|p| p.trim().is_empty()) {
                return Err(ConfigError::ValidationFailed(format!(
                    "Caller {} has an empty permission",
                    identity.caller_id
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::config::{AuditSinkKind, IdentityEntry, PolicyMode};
    use std::path::PathBuf;

    fn identity(caller_id: i64) -> IdentityEntry {
        IdentityEntry {
            caller_id,
            internal_id: caller_id * 10,
            active: true,
            display_name: None,
            permissions: vec!["/ia".to_string()],
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.orchestrator.policy_mode, PolicyMode::Permissive);
        assert_eq!(config.orchestrator.audit_error_max_chars, 200);
        assert_eq!(config.audit.sink, AuditSinkKind::Tracing);
        assert_eq!(config.audit.path, PathBuf::from(".amber/audit.jsonl"));
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r"
logging:
  level: debug
  format: pretty
orchestrator:
  policy_mode: strict
  execution_timeout_ms: 5000
audit:
  sink: file
  path: /var/log/amber/audit.jsonl
identities:
  - caller_id: 1001
    internal_id: 7
    permissions: ['/ia', '/report']
  - caller_id: 1002
    internal_id: 8
    active: false
";

        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "pretty");
        assert_eq!(config.orchestrator.policy_mode, PolicyMode::Strict);
        assert_eq!(config.orchestrator.execution_timeout_ms, Some(5000));
        assert_eq!(config.audit.sink, AuditSinkKind::File);
        assert_eq!(config.audit.max_entries, 10_000);
        assert_eq!(config.identities.len(), 2);
        assert!(config.identities[0].active);
        assert!(!config.identities[1].active);
        assert_eq!(config.identities[0].permissions, vec!["/ia", "/report"]);

        ConfigLoader::validate(&config).expect("Parsed config should be valid");
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "invalid".to_string();

        match ConfigLoader::validate(&config).unwrap_err() {
            ConfigError::InvalidLogLevel(level) => assert_eq!(level, "invalid"),
            other => panic!("Expected InvalidLogLevel error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_invalid_log_format() {
        let mut config = Config::default();
        config.logging.format = "xml".to_string();

        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::InvalidLogFormat(ref f) if f == "xml"
        ));
    }

    #[test]
    fn test_validate_invalid_rotation() {
        let mut config = Config::default();
        config.logging.rotation = "weekly".to_string();

        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::InvalidRotation(_)
        ));
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut config = Config::default();
        config.orchestrator.execution_timeout_ms = Some(0);

        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::InvalidTimeout(0)
        ));
    }

    #[test]
    fn test_validate_zero_limits() {
        let mut config = Config::default();
        config.orchestrator.audit_error_max_chars = 0;
        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::InvalidAuditErrorMaxChars(0)
        ));

        let mut config = Config::default();
        config.audit.max_entries = 0;
        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::InvalidMaxEntries(0)
        ));
    }

    #[test]
    fn test_validate_empty_audit_path() {
        let mut config = Config::default();
        config.audit.path = PathBuf::new();

        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::EmptyAuditPath
        ));
    }

    #[test]
    fn test_validate_duplicate_identity() {
        let config = Config {
            identities: vec![identity(5), identity(6), identity(5)],
            ..Default::default()
        };

        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::DuplicateIdentity(5)
        ));
    }

    #[test]
    fn test_validate_empty_permission() {
        let mut entry = identity(5);
        entry.permissions.push("  ".to_string());
        let config = Config {
            identities: vec![entry],
            ..Default::default()
        };

        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::ValidationFailed(_)
        ));
    }

    #[test]
    fn test_load_from_file_rejects_invalid_values() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "logging:\n  format: xml").unwrap();
        file.flush().unwrap();

        assert!(ConfigLoader::load_from_file(file.path()).is_err());
    }

    #[test]
    fn test_hierarchical_merging_and_env_override() {
        let dir = tempfile::TempDir::new().unwrap();
        let amber_dir = dir.path().join(".amber");
        std::fs::create_dir_all(&amber_dir).unwrap();
        std::fs::write(
            amber_dir.join("config.yaml"),
            "logging:\n  level: info\n  format: json\norchestrator:\n  audit_error_max_chars: 120\n",
        )
        .unwrap();
        std::fs::write(amber_dir.join("local.yaml"), "logging:\n  level: debug\n").unwrap();

        let config = temp_env::with_vars(
            [
                ("AMBER_ORCHESTRATOR__POLICY_MODE", Some("strict")),
                ("AMBER_AUDIT__SINK", Some("memory")),
            ],
            || ConfigLoader::load_from_dir(dir.path()).unwrap(),
        );

        assert_eq!(config.logging.level, "debug", "Local overrides project config");
        assert_eq!(config.logging.format, "json", "Base value persists when not overridden");
        assert_eq!(config.orchestrator.audit_error_max_chars, 120);
        assert_eq!(config.orchestrator.policy_mode, PolicyMode::Strict, "Env wins");
        assert_eq!(config.audit.sink, AuditSinkKind::Memory);
    }
}
