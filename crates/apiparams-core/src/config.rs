//! # Validation Configuration
//!
//! The default policy applied when a declaration leaves `required` or
//! `allow_nil` unset, the switches for presence and value checks, and the
//! strategy the CLI uses. Loaded from YAML or JSON; every field has a
//! default so an empty document is a valid configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// Which validation algorithm to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Walk the schema tree evaluating each descriptor's predicate.
    #[default]
    Direct,
    /// Project to JSON Schema and run the structural engine.
    Structural,
}

/// Validation policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Whether a parameter without an explicit `required` flag is required.
    #[serde(default)]
    pub required_by_default: bool,
    /// Whether a parameter without an explicit `allow_nil` flag accepts `null`.
    #[serde(default)]
    pub allow_nil_by_default: bool,
    /// Report required parameters that are absent.
    #[serde(default = "default_true")]
    pub validate_presence: bool,
    /// Check the values of present parameters.
    #[serde(default = "default_true")]
    pub validate_value: bool,
    /// Algorithm used by callers that honour configuration.
    #[serde(default)]
    pub strategy: Strategy,
    /// Report every structural violation instead of the first one.
    #[serde(default)]
    pub all_errors: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            required_by_default: false,
            allow_nil_by_default: false,
            validate_presence: true,
            validate_value: true,
            strategy: Strategy::Direct,
            all_errors: false,
        }
    }
}

impl ValidationConfig {
    /// Parse a configuration from YAML text. JSON is valid YAML, so this
    /// accepts both.
    pub fn from_yaml_str(content: &str) -> Result<Self, SchemaError> {
        serde_yaml::from_str(content).map_err(|e| SchemaError::ConfigLoad {
            source_name: "<string>".to_string(),
            reason: format!("invalid YAML: {e}"),
        })
    }

    /// Load a configuration file. `.json` files are parsed as JSON,
    /// everything else as YAML.
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let content = std::fs::read_to_string(path).map_err(|e| SchemaError::ConfigLoad {
            source_name: path.display().to_string(),
            reason: format!("cannot read file: {e}"),
        })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let parsed = match ext {
            "json" => serde_json::from_str(&content).map_err(|e| format!("invalid JSON: {e}")),
            _ => serde_yaml::from_str(&content).map_err(|e| format!("invalid YAML: {e}")),
        };
        parsed.map_err(|reason| SchemaError::ConfigLoad {
            source_name: path.display().to_string(),
            reason,
        })
    }

    /// Resolve a tri-state `required` flag.
    pub fn required(&self, flag: Option<bool>) -> bool {
        flag.unwrap_or(self.required_by_default)
    }

    /// Resolve a tri-state `allow_nil` flag.
    pub fn allow_nil(&self, flag: Option<bool>) -> bool {
        flag.unwrap_or(self.allow_nil_by_default)
    }
}
