//! # JSON-Schema Projection
//!
//! Renders a descriptor tree as a JSON Schema document for documentation
//! tooling and for the structural validation strategy.
//!
//! The projection is a pure function of the tree. Presence is not
//! projected: `required` never appears in the output, and is enforced only
//! by direct validation.
//!
//! Enum, Boolean, Predicate and Unconstrained fragments use `"type": "any"`,
//! the legacy spelling consumed by documentation generators. Use
//! [`strip_any_types`] before handing a document to a modern engine.

use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::descriptor::{Descriptor, StructDescriptor, Traversable, BOOLEAN_VALUES};
use crate::node::SchemaNode;

/// Legacy JSON Schema type accepting every value.
pub const ANY_TYPE: &str = "any";

/// Project a descriptor into a JSON Schema fragment.
pub fn project(descriptor: &Descriptor) -> Value {
    match descriptor.target() {
        Descriptor::Scalar(ty) => json!({
            "type": ty.json_type(),
            "description": descriptor.description(),
        }),
        Descriptor::Pattern(re) | Descriptor::Number(re) => json!({
            "type": "string",
            "pattern": re.as_str(),
            "description": descriptor.description(),
        }),
        Descriptor::Enum(values) => json!({
            "type": ANY_TYPE,
            "enum": values,
            "description": descriptor.description(),
        }),
        Descriptor::Boolean => json!({
            "type": ANY_TYPE,
            "enum": BOOLEAN_VALUES,
            "description": descriptor.description(),
        }),
        Descriptor::Predicate(p) => json!({
            "type": ANY_TYPE,
            "description": p.description(),
        }),
        Descriptor::Struct(s) => project_struct(s),
        Descriptor::Sequence(element) => json!({
            "type": "array",
            "items": project(element),
            "description": descriptor.description(),
        }),
        Descriptor::Unconstrained => json!({ "type": ANY_TYPE }),
        Descriptor::Custom(c) => c.json_schema(),
        Descriptor::Reference(node) => project(node.descriptor()),
    }
}

fn project_struct(descriptor: &StructDescriptor) -> Value {
    let properties: Map<String, Value> = descriptor
        .params()
        .iter()
        .map(|child| (child.name().to_string(), project_node(child)))
        .collect();
    json!({
        "type": "object",
        "properties": properties,
        "description": "Must be an Object",
    })
}

/// A node's fragment: its descriptor's projection, with the node's human
/// description in place of the descriptor's own.
fn project_node(node: &Arc<SchemaNode>) -> Value {
    let mut fragment = project(node.descriptor());
    if let (Some(desc), Value::Object(map)) = (node.desc(), &mut fragment) {
        map.insert("description".to_string(), Value::String(desc.to_string()));
    }
    fragment
}

/// Remove every `"type": "any"` entry from `schema`, recursively.
///
/// Only string values equal to `"any"` are removed, so a property that is
/// itself named `type` survives.
pub fn strip_any_types(schema: &mut Value) {
    match schema {
        Value::Object(map) => {
            if map.get("type").and_then(Value::as_str) == Some(ANY_TYPE) {
                map.remove("type");
            }
            map.values_mut().for_each(strip_any_types);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_any_types),
        _ => {}
    }
}

impl SchemaNode {
    /// The JSON Schema document for this node.
    pub fn to_json_schema(self: &Arc<Self>) -> Value {
        project_node(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apiparams_core::ScalarType;
    use regex::Regex;

    use crate::builder::{ParamOptions, TypeSpec};
    use crate::descriptor::{array_of, Predicate};
    use crate::node::Schema;

    fn leaf(spec: impl Into<TypeSpec>) -> Value {
        SchemaNode::new("test", spec, ParamOptions::default())
            .unwrap()
            .to_json_schema()
    }

    #[test]
    fn scalar_projects_primitive_type() {
        assert_eq!(
            leaf(ScalarType::Integer),
            json!({"type": "integer", "description": "Must be Integer"})
        );
        assert_eq!(leaf(ScalarType::Float)["type"], "number");
    }

    #[test]
    fn pattern_and_number_project_string_patterns() {
        let pattern = leaf(Regex::new("^[a-z]+$").unwrap());
        assert_eq!(pattern["type"], "string");
        assert_eq!(pattern["pattern"], "^[a-z]+$");

        let number = leaf(TypeSpec::number());
        assert_eq!(number["pattern"], crate::descriptor::NUMBER_PATTERN);
        assert_eq!(number["description"], "Must be a number.");
    }

    #[test]
    fn enum_and_boolean_project_any_with_values() {
        let e = leaf(TypeSpec::one_of([json!("a"), json!(1)]));
        assert_eq!(e["type"], "any");
        assert_eq!(e["enum"], json!(["a", 1]));
        assert_eq!(leaf(TypeSpec::bool())["enum"], json!(["true", "false"]));
    }

    #[test]
    fn unconstrained_and_predicate_project_any() {
        assert_eq!(leaf(TypeSpec::undef()), json!({"type": "any"}));
        let p = leaf(Predicate::new(|_: &Value| true).with_description("Must be even"));
        assert_eq!(p, json!({"type": "any", "description": "Must be even"}));
    }

    #[test]
    fn struct_projects_properties_without_required() {
        let schema = Schema::define(|p| {
            p.param("name", ScalarType::String).required(true);
            p.param("address", ScalarType::Object).block(|p| {
                p.param("street", ScalarType::String);
            });
        })
        .unwrap();
        let doc = schema.to_json_schema();
        assert_eq!(doc["type"], "object");
        assert_eq!(doc["properties"]["name"]["type"], "string");
        assert_eq!(doc["properties"]["address"]["properties"]["street"]["type"], "string");
        assert!(doc.get("required").is_none());
        assert!(doc["properties"]["address"].get("required").is_none());
    }

    #[test]
    fn sequence_projects_items() {
        let node = SchemaNode::with_block("list", ScalarType::Array, ParamOptions::default(), |p| {
            p.param("id", ScalarType::Integer);
        })
        .unwrap();
        let doc = node.to_json_schema();
        assert_eq!(doc["type"], "array");
        assert_eq!(doc["items"]["type"], "object");
        assert_eq!(doc["items"]["properties"]["id"]["type"], "integer");

        let tags = project(&array_of(ScalarType::String));
        assert_eq!(tags["items"]["type"], "string");
    }

    #[test]
    fn human_description_overrides_descriptor_description() {
        let schema = Schema::define(|p| {
            p.param("age", ScalarType::Integer).desc("Age in years");
            p.param("name", ScalarType::String);
        })
        .unwrap();
        let doc = schema.to_json_schema();
        assert_eq!(doc["properties"]["age"]["description"], "Age in years");
        assert_eq!(doc["properties"]["name"]["description"], "Must be String");
    }

    #[test]
    fn references_project_their_target() {
        let point = Schema::define(|p| {
            p.param("x", TypeSpec::number());
        })
        .unwrap();
        let reused = SchemaNode::new("origin", &point, ParamOptions::default()).unwrap();
        assert_eq!(reused.to_json_schema(), point.to_json_schema());
    }

    #[test]
    fn strip_any_keeps_properties_named_type() {
        let schema = Schema::define(|p| {
            p.param("type", TypeSpec::one_of(["a", "b"]));
            p.param("rest", TypeSpec::undef());
        })
        .unwrap();
        let mut doc = schema.to_json_schema();
        strip_any_types(&mut doc);
        assert_eq!(doc["type"], "object");
        assert!(doc["properties"]["type"].get("type").is_none());
        assert_eq!(doc["properties"]["type"]["enum"], json!(["a", "b"]));
        assert_eq!(doc["properties"]["rest"], json!({}));
    }
}
