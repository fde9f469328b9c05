//! # Declarative Definitions
//!
//! Loads a schema from a YAML or JSON document instead of builder code.
//!
//! ```yaml
//! params:
//!   - name: name
//!     type: string
//!     required: true
//!   - name: address
//!     type: object
//!     params:
//!       - { name: street, type: string }
//!   - { name: kind, enum: [a, b] }
//!   - { name: code, pattern: "^[A-Z]+$" }
//! ```
//!
//! Each entry becomes one declaration. `type` names a scalar marker
//! (`string`, `integer`, `float`, `boolean`, `object`, `array`, `null`) or a
//! sentinel (`number`, `bool`, `undef`); any other name is passed to the
//! resolver as a symbol, so custom matchers can claim it. `enum` and
//! `pattern` are alternatives to `type`. Nested `params` become the entry's
//! builder block. An entry without any of the three is `object` when it
//! has nested params and `undef` otherwise.
//!
//! Every entry is converted before any node is built, so a bad pattern is
//! reported with the parameter that carries it.

use std::path::Path;
use std::sync::Arc;

use apiparams_core::{ScalarType, SchemaError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::builder::{Declaration, ParamOptions, TypeSpec, UNDEF};
use crate::node::{Schema, SchemaNode};
use crate::resolver::Resolver;

/// A whole schema document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Definition {
    /// Top-level parameters in declaration order.
    #[serde(default)]
    pub params: Vec<ParamDefinition>,
}

/// One parameter entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParamDefinition {
    /// Parameter name, the key looked up in validated objects.
    pub name: String,
    /// Scalar marker, sentinel or custom symbol (`type` in documents).
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// Regular expression the string form must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Allowed values (`enum` in documents).
    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<Value>>,
    /// Human description, projected in place of the descriptor's own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    /// Presence flag. Unset falls back to the configured default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    /// Whether `null` is accepted. Unset falls back to the configured default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_nil: Option<bool>,
    /// Nested entries, run as this parameter's builder block.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<ParamDefinition>,
}

impl ParamDefinition {
    fn type_spec(&self) -> Result<TypeSpec, SchemaError> {
        let given = [
            self.type_name.is_some(),
            self.pattern.is_some(),
            self.values.is_some(),
        ];
        if given.iter().filter(|g| **g).count() > 1 {
            return Err(SchemaError::DefinitionLoad {
                source_name: self.name.clone(),
                reason: "at most one of 'type', 'pattern' and 'enum' may be given".to_string(),
            });
        }

        if let Some(source) = &self.pattern {
            let re = Regex::new(source).map_err(|e| SchemaError::InvalidPattern {
                name: self.name.clone(),
                reason: e.to_string(),
            })?;
            return Ok(re.into());
        }
        if let Some(values) = &self.values {
            return Ok(TypeSpec::Enum(values.clone()));
        }
        Ok(match self.type_name.as_deref() {
            Some(name) => ScalarType::from_name(name)
                .map(TypeSpec::Scalar)
                .unwrap_or_else(|| TypeSpec::symbol(name)),
            None if !self.params.is_empty() => TypeSpec::Scalar(ScalarType::Object),
            None => TypeSpec::symbol(UNDEF),
        })
    }

    fn options(&self) -> ParamOptions {
        ParamOptions {
            desc: self.desc.clone(),
            required: self.required,
            allow_nil: self.allow_nil,
        }
    }

    /// Convert this entry, and its nested entries, into a declaration.
    pub fn to_declaration(&self) -> Result<Declaration, SchemaError> {
        let mut declaration = Declaration::new(&self.name, self.type_spec()?);
        declaration.options(self.options());

        if !self.params.is_empty() {
            let children = to_declarations(&self.params)?;
            declaration.block(move |p| {
                for child in children {
                    p.push(child);
                }
            });
        }
        Ok(declaration)
    }
}

fn to_declarations(params: &[ParamDefinition]) -> Result<Vec<Declaration>, SchemaError> {
    params.iter().map(ParamDefinition::to_declaration).collect()
}

impl Definition {
    /// Parse a definition from YAML text. JSON is valid YAML, so this
    /// accepts both.
    pub fn from_yaml_str(content: &str) -> Result<Self, SchemaError> {
        serde_yaml::from_str(content).map_err(|e| SchemaError::DefinitionLoad {
            source_name: "<string>".to_string(),
            reason: format!("invalid YAML: {e}"),
        })
    }

    /// Parse a definition from JSON text.
    pub fn from_json_str(content: &str) -> Result<Self, SchemaError> {
        serde_json::from_str(content).map_err(|e| SchemaError::DefinitionLoad {
            source_name: "<string>".to_string(),
            reason: format!("invalid JSON: {e}"),
        })
    }

    /// Load a definition file. `.json` files are parsed as JSON,
    /// everything else as YAML.
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let content = std::fs::read_to_string(path).map_err(|e| SchemaError::DefinitionLoad {
            source_name: path.display().to_string(),
            reason: format!("cannot read file: {e}"),
        })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let parsed = match ext {
            "json" => serde_json::from_str(&content).map_err(|e| format!("invalid JSON: {e}")),
            _ => serde_yaml::from_str(&content).map_err(|e| format!("invalid YAML: {e}")),
        };
        let definition: Self = parsed.map_err(|reason| SchemaError::DefinitionLoad {
            source_name: path.display().to_string(),
            reason,
        })?;
        tracing::debug!(
            path = %path.display(),
            params = definition.params.len(),
            "loaded definition"
        );
        Ok(definition)
    }

    /// Build the root node with the built-in resolver.
    pub fn build(&self) -> Result<Arc<SchemaNode>, SchemaError> {
        self.build_with(Resolver::new())
    }

    /// Build the root node with a custom resolver.
    pub fn build_with(&self, resolver: Resolver) -> Result<Arc<SchemaNode>, SchemaError> {
        let declarations = to_declarations(&self.params)?;
        Schema::define_with(resolver, move |p| {
            for declaration in declarations {
                p.push(declaration);
            }
        })
    }
}
