//! # Value Helpers
//!
//! Number and Boolean descriptors compare the *string form* of a value,
//! not its JSON type: `"12"` and `12` are both a number, `"true"` and
//! `true` are both a boolean. This module defines that string form once.

use serde_json::Value;

/// The string form of a runtime value.
///
/// Strings are returned verbatim. Every other value renders as compact
/// JSON text, so `true` becomes `"true"`, `12` becomes `"12"` and `null`
/// becomes `"null"`.
pub fn string_form(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
