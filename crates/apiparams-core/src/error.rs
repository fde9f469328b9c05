//! # Error Types: Schema Construction Errors
//!
//! Errors raised while a schema is being set up: resolving type
//! specifiers, building child lists, merging struct descriptors, loading
//! definition and configuration files, and compiling a projected schema
//! for the structural engine.
//!
//! ## Design
//!
//! - Every variant is fatal for the schema it concerns. None of them is
//!   deferred to the first validation call.
//! - The enum is `Clone` so a failed build can be reported from more than
//!   one place without re-running the builder.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The variant of a resolved descriptor, used in error reports and merge
/// compatibility checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DescriptorKind {
    /// Type-marker check.
    Scalar,
    /// Regular-expression match.
    Pattern,
    /// Membership in an ordered literal list.
    Enum,
    /// Caller-supplied check function.
    Predicate,
    /// Object with named children.
    Struct,
    /// Homogeneous list.
    Sequence,
    /// Accepts anything.
    Unconstrained,
    /// Non-negative integer in string form.
    Number,
    /// `"true"` or `"false"` in string form.
    Boolean,
    /// Extension descriptor registered by the host.
    Custom,
}

impl DescriptorKind {
    /// Stable lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::Pattern => "pattern",
            Self::Enum => "enum",
            Self::Predicate => "predicate",
            Self::Struct => "struct",
            Self::Sequence => "sequence",
            Self::Unconstrained => "unconstrained",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for DescriptorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error while constructing, composing or loading a schema.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// No matcher accepted the type specifier.
    #[error("unresolved descriptor for parameter '{name}': no matcher accepts {spec}")]
    Unresolved {
        /// Name of the parameter being declared.
        name: String,
        /// Rendering of the rejected type specifier.
        spec: String,
    },

    /// Two same-named children have shapes that cannot be merged.
    #[error("cannot merge parameter '{name}': {left} conflicts with {right}")]
    MergeConflict {
        /// Name shared by both children.
        name: String,
        /// Kind of the left-hand descriptor.
        left: DescriptorKind,
        /// Kind of the right-hand descriptor.
        right: DescriptorKind,
    },

    /// A builder block declared the same name twice.
    #[error("duplicate parameter '{name}' in the same block")]
    DuplicateParam {
        /// The repeated name.
        name: String,
    },

    /// A composition would make a struct contain itself.
    #[error("schema cycle through parameter '{name}'")]
    Cycle {
        /// Name of the node that closes the cycle.
        name: String,
    },

    /// A regular expression in a definition failed to compile.
    #[error("invalid pattern for parameter '{name}': {reason}")]
    InvalidPattern {
        /// Name of the parameter carrying the pattern.
        name: String,
        /// Compiler error text.
        reason: String,
    },

    /// The structural engine rejected the projected schema.
    #[error("structural engine error: {0}")]
    Engine(String),

    /// A declarative definition could not be read or parsed.
    #[error("definition load error for '{source_name}': {reason}")]
    DefinitionLoad {
        /// Path or label of the definition.
        source_name: String,
        /// Why loading failed.
        reason: String,
    },

    /// A configuration file could not be read or parsed.
    #[error("config load error for '{source_name}': {reason}")]
    ConfigLoad {
        /// Path or label of the configuration.
        source_name: String,
        /// Why loading failed.
        reason: String,
    },
}
