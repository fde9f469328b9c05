//! # Scalar Type Markers
//!
//! The type markers an author can name in a declaration. A marker alone
//! resolves to a Scalar descriptor (a JSON type check). `Object` and
//! `Array` double as the structural markers: together with a builder block
//! they resolve to Struct and Sequence descriptors instead.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A JSON primitive type marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarType {
    /// JSON string.
    String,
    /// JSON number without a fractional part.
    Integer,
    /// Any JSON number.
    Float,
    /// JSON `true` / `false`.
    Boolean,
    /// JSON object. With a builder block this is the Struct marker.
    Object,
    /// JSON array. With a builder block this is the Sequence marker.
    Array,
    /// JSON `null`.
    Null,
}

impl ScalarType {
    /// Whether `value` is of this type.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Float => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Object => value.is_object(),
            Self::Array => value.is_array(),
            Self::Null => value.is_null(),
        }
    }

    /// The JSON-Schema primitive this marker projects to.
    pub fn json_type(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
            Self::Null => "null",
        }
    }

    /// Parse a marker from its definition-file spelling.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Self::String),
            "integer" => Some(Self::Integer),
            "float" => Some(Self::Float),
            "boolean" => Some(Self::Boolean),
            "object" => Some(Self::Object),
            "array" => Some(Self::Array),
            "null" => Some(Self::Null),
            _ => None,
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "String",
            Self::Integer => "Integer",
            Self::Float => "Float",
            Self::Boolean => "Boolean",
            Self::Object => "Object",
            Self::Array => "Array",
            Self::Null => "Null",
        };
        f.write_str(name)
    }
}
