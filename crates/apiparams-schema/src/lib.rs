//! # apiparams-schema: Parameter Schemas and Validation
//!
//! Declares parameter trees, validates runtime values against them,
//! projects them to JSON Schema and composes them by merge.
//!
//! ## Building
//!
//! Schemas are declared through a builder block. Each `param` call names a
//! field and gives a type specifier; the [`Resolver`] turns the specifier
//! into exactly one [`Descriptor`]:
//!
//! ```
//! use apiparams_schema::{Schema, ScalarType, TypeSpec};
//! use serde_json::json;
//!
//! let schema = Schema::define(|p| {
//!     p.param("name", ScalarType::String).required(true);
//!     p.param("age", TypeSpec::number()).desc("Age in years");
//!     p.param("address", ScalarType::Object).block(|p| {
//!         p.param("street", ScalarType::String);
//!     });
//! })
//! .unwrap();
//!
//! assert!(schema.validate(&json!({"name": "Peter", "age": "42"})).is_ok());
//! assert!(schema.validate(&json!({"age": "42"})).is_err());
//! ```
//!
//! Every declaration in the tree is resolved before `define` returns.
//! An unresolvable specifier is a [`SchemaError`], never a silent accept.
//!
//! ## Validating
//!
//! - **Direct** ([`SchemaNode::validate`]): evaluates each descriptor's own
//!   check and enforces `required`.
//! - **Structural** ([`StructuralValidator`]): projects the tree to JSON
//!   Schema, runs a [`StructuralEngine`], and maps the first violation back
//!   onto a node. Presence is not enforced.
//!
//! ## Crate Policy
//!
//! - A built tree is read-only except through merge.
//! - Builder blocks run exactly once.
//! - No `.unwrap()` outside tests and doc examples.

pub mod builder;
pub mod definition;
pub mod descriptor;
pub mod error;
pub mod merge;
pub mod node;
pub mod project;
pub mod resolver;
pub mod structural;
mod validate;

pub use apiparams_core::{DescriptorKind, ScalarType, SchemaError, Strategy, ValidationConfig};

pub use builder::{Block, Declaration, ParamOptions, ParamsBuilder, TypeSpec};
pub use definition::{Definition, ParamDefinition};
pub use descriptor::{
    array_of, CustomDescriptor, Descriptor, Predicate, StructDescriptor, Traversable, Verdict,
};
pub use error::{Error, ParamError, ParamErrors};
pub use merge::merge;
pub use node::{Schema, SchemaNode};
pub use project::{project, strip_any_types};
pub use resolver::{Builtin, MatchContext, Matcher, Resolver, SymbolMatcher, BUILTIN_ORDER};
pub use structural::{locate, Fragment, JsonSchemaEngine, StructuralEngine, StructuralValidator};
