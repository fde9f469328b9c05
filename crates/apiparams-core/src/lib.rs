//! # apiparams-core: Foundational Types for apiparams
//!
//! This crate is the leaf of the apiparams workspace. It defines the types
//! every other crate agrees on: construction-time errors, the validation
//! policy loaded from configuration, the scalar type markers used in type
//! specifiers, and the "string form" of a runtime value used by the
//! string-comparing descriptors.
//!
//! ## Key Design Principles
//!
//! 1. **Construction errors are distinct from value errors.** A
//!    [`SchemaError`] means the schema itself is wrong (unresolvable type
//!    specifier, conflicting merge) and surfaces during setup. Per-value
//!    failures live in `apiparams-schema`, next to the nodes they name.
//!
//! 2. **Runtime values are `serde_json::Value`.** Whatever the transport,
//!    parameters are validated as JSON trees.
//!
//! 3. **Policy is data.** Defaults for unset `required` / `allow_nil` flags
//!    and the validation strategy come from [`ValidationConfig`], which is
//!    plain serde and loads from YAML or JSON.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `apiparams-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod config;
pub mod error;
pub mod scalar;
pub mod value;

pub use config::{Strategy, ValidationConfig};
pub use error::{DescriptorKind, SchemaError};
pub use scalar::ScalarType;
pub use value::string_form;
