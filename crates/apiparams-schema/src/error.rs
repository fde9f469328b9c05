//! # Validation Errors
//!
//! Per-value failures carry the node they concern, so callers can report
//! the parameter's name, its dotted path or its description without
//! re-walking the schema.

use std::fmt;
use std::sync::Arc;

use apiparams_core::SchemaError;
use serde_json::Value;
use thiserror::Error;

use crate::node::SchemaNode;

/// A value failed validation.
#[derive(Error, Debug, Clone)]
pub enum ParamError {
    /// A required child is absent from the input.
    #[error("Missing parameter {}", .node.name())]
    Missing {
        /// The absent child.
        node: Arc<SchemaNode>,
    },

    /// A value does not satisfy its node's descriptor.
    #[error("Invalid parameter '{}' value {value}: {reason}", .node.name())]
    Invalid {
        /// Node whose constraint failed.
        node: Arc<SchemaNode>,
        /// The offending value.
        value: Value,
        /// Descriptor description, or a predicate's own message.
        reason: String,
    },
}

impl ParamError {
    /// The node the error is attributed to.
    pub fn node(&self) -> &Arc<SchemaNode> {
        match self {
            Self::Missing { node } | Self::Invalid { node, .. } => node,
        }
    }

    /// The offending value. `None` for missing parameters.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Missing { .. } => None,
            Self::Invalid { value, .. } => Some(value),
        }
    }

    /// Whether this is a missing-parameter error.
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing { .. })
    }
}

/// Every violation found by an all-errors validation run.
#[derive(Debug, Clone)]
pub struct ParamErrors {
    errors: Vec<ParamError>,
}

impl ParamErrors {
    pub(crate) fn new(errors: Vec<ParamError>) -> Self {
        Self { errors }
    }

    /// Returns the number of errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns true if there are no errors.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns a slice of all errors.
    pub fn errors(&self) -> &[ParamError] {
        &self.errors
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<ParamError> {
        self.errors
    }
}

impl fmt::Display for ParamErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParamErrors {}

/// Any failure of a validation entry point.
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// A single per-value failure.
    #[error(transparent)]
    Param(#[from] ParamError),

    /// Several per-value failures.
    #[error(transparent)]
    Params(#[from] ParamErrors),

    /// The schema could not be used.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}
