//! Tool descriptors: metadata, parameter declarations and validation rules.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::errors::ParameterError;

/// Raw or normalized invocation parameters, keyed by parameter name.
pub type Parameters = HashMap<String, Value>;

/// Closed set of tool categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCategory {
    /// Queries against the data store.
    DataQuery,
    /// Assistant/system level commands.
    System,
    /// Identity and account management.
    Identity,
    /// Reporting and analytics.
    Analytics,
    /// General helpers.
    Utility,
    /// Bridges to external systems.
    Integration,
}

impl ToolCategory {
    pub const ALL: [ToolCategory; 6] = [
        Self::DataQuery,
        Self::System,
        Self::Identity,
        Self::Analytics,
        Self::Utility,
        Self::Integration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DataQuery => "data_query",
            Self::System => "system",
            Self::Identity => "identity",
            Self::Analytics => "analytics",
            Self::Utility => "utility",
            Self::Integration => "integration",
        }
    }
}

impl fmt::Display for ToolCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "data_query" | "database" => Ok(Self::DataQuery),
            "system" => Ok(Self::System),
            "identity" | "user_management" => Ok(Self::Identity),
            "analytics" => Ok(Self::Analytics),
            "utility" => Ok(Self::Utility),
            "integration" => Ok(Self::Integration),
            other => Err(format!("Unknown tool category: {other}")),
        }
    }
}

/// Primitive kind of a parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    String,
    Integer,
    Float,
    Boolean,
    List,
    Map,
}

impl ParameterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::List => "list",
            Self::Map => "map",
        }
    }

    /// Whether a JSON value is of this kind. `Float` accepts integers too.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Float => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::List => value.is_array(),
            Self::Map => value.is_object(),
        }
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declarative checks applied to a supplied parameter value.
///
/// Lengths count characters for strings and elements for lists and maps.
/// Value bounds apply to numbers only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<Value>>,
}

impl ValidationRules {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Declaration of one tool input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ParameterType,
    pub description: String,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "ValidationRules::is_empty")]
    pub rules: ValidationRules,
}

impl ToolParameter {
    /// Create a required parameter with no rules.
    pub fn new(name: impl Into<String>, kind: ParameterType, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            description: description.into(),
            required: true,
            default: None,
            rules: ValidationRules::default(),
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_min_length(mut self, min: usize) -> Self {
        self.rules.min_length = Some(min);
        self
    }

    pub fn with_max_length(mut self, max: usize) -> Self {
        self.rules.max_length = Some(max);
        self
    }

    pub fn with_min_value(mut self, min: f64) -> Self {
        self.rules.min_value = Some(min);
        self
    }

    pub fn with_max_value(mut self, max: f64) -> Self {
        self.rules.max_value = Some(max);
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.rules.pattern = Some(pattern.into());
        self
    }

    pub fn with_allowed_values(mut self, values: Vec<Value>) -> Self {
        self.rules.allowed_values = Some(values);
        self
    }

    /// Check a supplied value against this descriptor's type and rules,
    /// compiling the `pattern` rule on the spot.
    pub fn validate(&self, value: &Value) -> Result<(), ParameterError> {
        let pattern = self.compile_pattern()?;
        self.validate_with(value, pattern.as_ref())
    }

    /// Compile the `pattern` rule, if any.
    pub fn compile_pattern(&self) -> Result<Option<Regex>, ParameterError> {
        self.rules
            .pattern
            .as_deref()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| {
                    ParameterError::Invalid(format!(
                        "parameter '{}' has an invalid pattern: {e}",
                        self.name
                    ))
                })
            })
            .transpose()
    }

    /// Like [`validate`](Self::validate), with `pattern` the already compiled
    /// form of the `pattern` rule.
    pub fn validate_with(&self, value: &Value, pattern: Option<&Regex>) -> Result<(), ParameterError> {
        if !self.kind.accepts(value) {
            return Err(ParameterError::WrongType {
                name: self.name.clone(),
                expected: self.kind.to_string(),
            });
        }

        self.check_length(value)?;
        self.check_bounds(value)?;

        if let (Some(regex), Some(text)) = (pattern, value.as_str()) {
            if !regex.is_match(text) {
                return Err(ParameterError::PatternMismatch {
                    name: self.name.clone(),
                    pattern: regex.as_str().to_string(),
                });
            }
        }

        if let Some(ref allowed) = self.rules.allowed_values {
            if !allowed.contains(value) {
                let allowed = allowed
                    .iter()
                    .map(|v| match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                return Err(ParameterError::NotAllowed {
                    name: self.name.clone(),
                    allowed,
                });
            }
        }

        Ok(())
    }

    fn check_length(&self, value: &Value) -> Result<(), ParameterError> {
        let (len, is_text) = match value {
            Value::String(s) => (s.chars().count(), true),
            Value::Array(items) => (items.len(), false),
            Value::Object(map) => (map.len(), false),
            _ => return Ok(()),
        };

        if let Some(min) = self.rules.min_length {
            if len < min {
                let name = self.name.clone();
                return Err(if is_text {
                    ParameterError::TooShort { name, min }
                } else {
                    ParameterError::TooFewElements { name, min }
                });
            }
        }

        if let Some(max) = self.rules.max_length {
            if len > max {
                let name = self.name.clone();
                return Err(if is_text {
                    ParameterError::TooLong { name, max }
                } else {
                    ParameterError::TooManyElements { name, max }
                });
            }
        }

        Ok(())
    }

    fn check_bounds(&self, value: &Value) -> Result<(), ParameterError> {
        let Some(number) = value.as_f64() else {
            return Ok(());
        };

        if let Some(min) = self.rules.min_value {
            if number < min {
                return Err(ParameterError::BelowMinimum {
                    name: self.name.clone(),
                    min,
                });
            }
        }

        if let Some(max) = self.rules.max_value {
            if number > max {
                return Err(ParameterError::AboveMaximum {
                    name: self.name.clone(),
                    max,
                });
            }
        }

        Ok(())
    }
}

/// Self-description of a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolMetadata {
    /// Unique tool name.
    pub name: String,
    pub description: String,
    /// Invocation aliases (chat commands) that address this tool.
    pub aliases: Vec<String>,
    pub category: ToolCategory,
    pub requires_auth: bool,
    pub required_permissions: Vec<String>,
    pub version: String,
    pub author: String,
}

impl ToolMetadata {
    /// Create metadata with auth required, no aliases and no permissions.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        category: ToolCategory,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            aliases: Vec::new(),
            category,
            requires_auth: true,
            required_permissions: Vec::new(),
            version: "1.0.0".to_string(),
            author: "System".to_string(),
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.required_permissions.push(permission.into());
        self
    }

    pub fn with_auth(mut self, requires_auth: bool) -> Self {
        self.requires_auth = requires_auth;
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// The alias used when a tool is addressed by name.
    pub fn primary_alias(&self) -> Option<&str> {
        self.aliases.first().map(String::as_str)
    }
}
