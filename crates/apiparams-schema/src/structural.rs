//! # Structural Validation
//!
//! Validates a value by projecting the node to JSON Schema and handing both
//! to a structural engine. Engine records are mapped back onto schema nodes.
//!
//! ## Wrapping
//!
//! The value is wrapped as `{"root": value}` and the schema as an object
//! with a single `root` property, so every fragment path starts at
//! `#/root` whatever the shape of the top-level node.
//!
//! ## Locating
//!
//! A fragment path is resolved to a node by dropping the `#/root` prefix,
//! splitting on `/`, unescaping JSON-pointer segments and walking
//! `param(name)` from the root. Purely numeric segments are list indices
//! and are skipped: a Sequence validates every element against one element
//! schema, so no per-index node exists. The walk stops at the deepest node
//! that resolves.
//!
//! ## Error Reporting
//!
//! [`StructuralValidator::validate`] surfaces only the first record, even
//! when several constraints fail at once. [`StructuralValidator::validate_all`]
//! reports every record.

use std::sync::Arc;

use apiparams_core::SchemaError;
use serde_json::{json, Value};

use crate::error::{Error, ParamError, ParamErrors};
use crate::node::SchemaNode;
use crate::project::strip_any_types;

/// Name of the wrapper property holding the validated value.
pub const ROOT_PROPERTY: &str = "root";

/// One violation reported by a structural engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// Slash-delimited pointer rooted at `#/root`.
    pub path: String,
    /// Engine message.
    pub message: String,
}

impl Fragment {
    /// The path as a JSON pointer into the unwrapped value. Empty when the
    /// violation is the value itself.
    pub fn pointer(&self) -> &str {
        unwrapped(&self.path)
    }

    /// The part of `value` the violation points at.
    pub fn value_in<'a>(&self, value: &'a Value) -> Option<&'a Value> {
        value.pointer(self.pointer())
    }
}

/// A JSON Schema validation engine.
pub trait StructuralEngine: Send + Sync {
    /// Every violation of `schema` by `value`, in engine order.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Engine`] if the schema cannot be compiled.
    fn fully_validate(
        &self,
        schema: &Value,
        value: &Value,
    ) -> Result<Vec<Fragment>, SchemaError>;
}

/// [`StructuralEngine`] backed by the `jsonschema` crate (Draft 2020-12).
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSchemaEngine;

impl StructuralEngine for JsonSchemaEngine {
    fn fully_validate(
        &self,
        schema: &Value,
        value: &Value,
    ) -> Result<Vec<Fragment>, SchemaError> {
        let mut schema = schema.clone();
        strip_any_types(&mut schema);

        let mut opts = jsonschema::options();
        opts.with_draft(jsonschema::Draft::Draft202012);
        let validator = opts
            .build(&schema)
            .map_err(|e| SchemaError::Engine(e.to_string()))?;

        Ok(validator
            .iter_errors(value)
            .map(|e| Fragment {
                path: format!("#{}", e.instance_path),
                message: e.to_string(),
            })
            .collect())
    }
}

/// Validates values against a node through a [`StructuralEngine`].
#[derive(Debug, Clone)]
pub struct StructuralValidator<E = JsonSchemaEngine> {
    root: Arc<SchemaNode>,
    engine: E,
}

impl StructuralValidator<JsonSchemaEngine> {
    /// A validator for `root` using the `jsonschema` engine.
    pub fn new(root: Arc<SchemaNode>) -> Self {
        Self::with_engine(root, JsonSchemaEngine)
    }
}

impl<E: StructuralEngine> StructuralValidator<E> {
    /// A validator for `root` using `engine`.
    pub fn with_engine(root: Arc<SchemaNode>, engine: E) -> Self {
        Self { root, engine }
    }

    /// The node values are validated against.
    pub fn root(&self) -> &Arc<SchemaNode> {
        &self.root
    }

    /// The wrapped schema document handed to the engine.
    pub fn wrapped_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": { ROOT_PROPERTY: self.root.to_json_schema() },
        })
    }

    /// Validate `value`, reporting at most one error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Param`] for the first engine record and
    /// [`Error::Schema`] if the engine fails.
    pub fn validate(&self, value: &Value) -> Result<(), Error> {
        match self.violations(value)?.into_iter().next() {
            None => Ok(()),
            Some(first) => Err(first.into()),
        }
    }

    /// Validate `value`, reporting every engine record.
    pub fn validate_all(&self, value: &Value) -> Result<(), Error> {
        let errors = self.violations(value)?;
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ParamErrors::new(errors).into())
        }
    }

    /// Raw engine records for `value`, in engine order.
    pub fn fragments(&self, value: &Value) -> Result<Vec<Fragment>, SchemaError> {
        let wrapped = json!({ ROOT_PROPERTY: value });
        let fragments = self.engine.fully_validate(&self.wrapped_schema(), &wrapped)?;
        tracing::debug!(
            node = self.root.name(),
            violations = fragments.len(),
            "structural validation finished"
        );
        Ok(fragments)
    }

    /// Every engine record, located on the schema tree.
    ///
    /// Each error carries the whole validated value. Use
    /// [`Fragment::value_in`] on [`Self::fragments`] for the part a record
    /// points at.
    pub fn violations(&self, value: &Value) -> Result<Vec<ParamError>, SchemaError> {
        Ok(self
            .fragments(value)?
            .iter()
            .map(|fragment| {
                let node = locate(&self.root, &fragment.path);
                ParamError::Invalid {
                    reason: node.description(),
                    value: value.clone(),
                    node,
                }
            })
            .collect())
    }
}

/// `path` with the `#/root` wrapper prefix removed.
fn unwrapped(path: &str) -> &str {
    let path = path.strip_prefix('#').unwrap_or(path);
    path.strip_prefix('/')
        .and_then(|p| p.strip_prefix(ROOT_PROPERTY))
        .unwrap_or(path)
}

/// Path segments below the wrapper, unescaped.
fn segments(path: &str) -> Vec<String> {
    unwrapped(path)
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| s.replace("~1", "/").replace("~0", "~"))
        .collect()
}

fn is_index(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

/// Resolve a fragment path to the deepest matching node under `root`.
pub fn locate(root: &Arc<SchemaNode>, path: &str) -> Arc<SchemaNode> {
    let mut node = Arc::clone(root);
    for segment in segments(path).iter().filter(|s| !is_index(s)) {
        match node.param(segment) {
            Some(child) => node = child,
            None => break,
        }
    }
    node
}
