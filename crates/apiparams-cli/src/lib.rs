//! # apiparams-cli: Command-Line Interface
//!
//! Validates YAML/JSON documents against declarative parameter schemas
//! and exports the JSON Schema projection of a schema.
//!
//! ## Subcommands
//!
//! - `validate`: Validate a document with the direct or structural strategy
//! - `json-schema`: Print the JSON Schema projection of a definition
//!
//! ## Crate Policy
//!
//! - CLI construction (argument parsing) is separated from business logic.
//! - Handler functions delegate to `apiparams-schema` and return values;
//!   printing and exit codes belong to `main`.

pub mod document;
pub mod export;
pub mod validate;
