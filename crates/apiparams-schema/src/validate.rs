//! # Direct Validation
//!
//! Recursive validation that evaluates each descriptor's own check.
//!
//! - **Struct**: the value must be an object. Children are visited in
//!   declaration order; a required child that is absent raises `Missing`,
//!   a present one is validated recursively.
//! - **Sequence**: the value must be an array. Every element is validated
//!   against the element descriptor in order; the first failure wins.
//! - **Anything else**: the descriptor's check decides, and a rejection
//!   raises `Invalid` with the descriptor's reason.
//!
//! This is the only strategy that enforces presence. The projected JSON
//! Schema deliberately omits `required`.

use std::sync::Arc;

use apiparams_core::ValidationConfig;
use serde_json::Value;

use crate::descriptor::{Descriptor, StructDescriptor, Traversable, Verdict};
use crate::error::ParamError;
use crate::node::SchemaNode;

impl SchemaNode {
    /// Validate `value` with the default policy.
    ///
    /// # Errors
    ///
    /// Returns the first [`ParamError`] met in declaration order.
    pub fn validate(self: &Arc<Self>, value: &Value) -> Result<(), ParamError> {
        self.validate_with(value, &ValidationConfig::default())
    }

    /// Validate `value` under `config`.
    pub fn validate_with(
        self: &Arc<Self>,
        value: &Value,
        config: &ValidationConfig,
    ) -> Result<(), ParamError> {
        validate_node(self, value, config)
    }
}

fn validate_node(
    node: &Arc<SchemaNode>,
    value: &Value,
    config: &ValidationConfig,
) -> Result<(), ParamError> {
    if value.is_null() && node.allows_nil(config) {
        return Ok(());
    }
    validate_descriptor(node, node.descriptor(), value, config)
}

fn validate_descriptor(
    node: &Arc<SchemaNode>,
    descriptor: &Descriptor,
    value: &Value,
    config: &ValidationConfig,
) -> Result<(), ParamError> {
    match descriptor.target() {
        Descriptor::Struct(s) => validate_struct(node, s, value, config),
        Descriptor::Sequence(element) => {
            let items = value
                .as_array()
                .ok_or_else(|| invalid(node, value, descriptor.description()))?;
            items
                .iter()
                .try_for_each(|item| validate_descriptor(node, element, item, config))
        }
        leaf => match leaf.check(value) {
            Verdict::Accept => Ok(()),
            Verdict::Reject(reason) => Err(invalid(node, value, reason)),
        },
    }
}

fn validate_struct(
    node: &Arc<SchemaNode>,
    descriptor: &StructDescriptor,
    value: &Value,
    config: &ValidationConfig,
) -> Result<(), ParamError> {
    let object = value
        .as_object()
        .ok_or_else(|| invalid(node, value, "Must be an Object".to_string()))?;

    for child in descriptor.params() {
        match object.get(child.name()) {
            None => {
                if config.validate_presence && child.is_required(config) {
                    return Err(ParamError::Missing { node: child });
                }
            }
            Some(child_value) => {
                if config.validate_value {
                    validate_node(&child, child_value, config)?;
                }
            }
        }
    }
    Ok(())
}

fn invalid(node: &Arc<SchemaNode>, value: &Value, reason: String) -> ParamError {
    ParamError::Invalid {
        node: Arc::clone(node),
        value: value.clone(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apiparams_core::ScalarType;
    use regex::Regex;
    use serde_json::json;

    use crate::builder::{ParamOptions, TypeSpec};
    use crate::descriptor::{array_of, Predicate};
    use crate::node::Schema;

    fn assert_invalid(result: Result<(), ParamError>, node_name: &str, reason_part: &str) {
        match result {
            Err(ParamError::Invalid { node, reason, .. }) => {
                assert_eq!(node.name(), node_name);
                assert!(reason.contains(reason_part), "reason was {reason:?}");
            }
            other => panic!("Expected Invalid on '{node_name}', got: {other:?}"),
        }
    }

    fn leaf(spec: impl Into<TypeSpec>) -> Arc<SchemaNode> {
        SchemaNode::new("test", spec, ParamOptions::default()).unwrap()
    }

    #[test]
    fn type_descriptor() {
        let node = leaf(ScalarType::String);
        node.validate(&json!("valid")).unwrap();
        assert_invalid(node.validate(&json!(123)), "test", "Must be String");
    }

    #[test]
    fn regexp_descriptor() {
        let node = leaf(Regex::new("^valid").unwrap());
        node.validate(&json!("valid")).unwrap();
        assert_invalid(node.validate(&json!("invalid")), "test", "Must match");
    }

    #[test]
    fn enum_descriptor() {
        let node = leaf(TypeSpec::one_of(["valid", "valider"]));
        node.validate(&json!("valid")).unwrap();
        assert_invalid(node.validate(&json!("invalid")), "test", "Must be one of");
    }

    #[test]
    fn proc_descriptor_uses_dynamic_reason() {
        let node = leaf(Predicate::new(|v: &Value| {
            if v == "valid" {
                json!(true)
            } else {
                json!("Has to be valid")
            }
        }));
        node.validate(&json!("valid")).unwrap();
        assert_invalid(node.validate(&json!("invalid")), "test", "Has to be valid");
    }

    #[test]
    fn undef_descriptor_accepts_anything() {
        let node = leaf(TypeSpec::undef());
        node.validate(&json!("whatever")).unwrap();
        node.validate(&json!({"nested": [1, 2]})).unwrap();
    }

    #[test]
    fn number_descriptor() {
        let node = leaf(TypeSpec::number());
        node.validate(&json!("123")).unwrap();
        assert_invalid(node.validate(&json!("a23")), "test", "Must be a number");
    }

    #[test]
    fn boolean_descriptor() {
        let node = leaf(TypeSpec::bool());
        node.validate(&json!("true")).unwrap();
        assert_invalid(node.validate(&json!("no")), "test", "Must be 'true' or 'false'");
    }

    #[test]
    fn hash_descriptor_attributes_to_child() {
        let node = SchemaNode::with_block("test", ScalarType::Object, ParamOptions::default(), |p| {
            p.param("name", ScalarType::String);
            p.param("address", ScalarType::Object).block(|p| {
                p.param("street", ScalarType::String);
                p.param("zip", ScalarType::String);
            });
        })
        .unwrap();
        node.validate(&json!({"name": "valid"})).unwrap();
        assert_invalid(node.validate(&json!({"name": 1})), "name", "Must be String");
        assert_invalid(
            node.validate(&json!({"address": {"street": 123}})),
            "street",
            "Must be String",
        );
    }

    #[test]
    fn missing_required_struct_is_reported_on_the_struct() {
        let schema = Schema::define(|p| {
            p.param("name", ScalarType::String);
            p.param("address", ScalarType::Object).required(true).block(|p| {
                p.param("street", ScalarType::String).required(true);
            });
        })
        .unwrap();

        match schema.validate(&json!({"name": "Peter"})) {
            Err(ParamError::Missing { node }) => assert_eq!(node.name(), "address"),
            other => panic!("Expected Missing(address), got: {other:?}"),
        }
        match schema.validate(&json!({"address": {}})) {
            Err(ParamError::Missing { node }) => assert_eq!(node.path(), "address.street"),
            other => panic!("Expected Missing(street), got: {other:?}"),
        }
    }

    #[test]
    fn array_descriptor_validates_every_element() {
        let node = SchemaNode::with_block("test", ScalarType::Array, ParamOptions::default(), |p| {
            p.param("name", ScalarType::String);
        })
        .unwrap();
        node.validate(&json!([{"name": "valid"}, {"name": "also"}])).unwrap();
        assert_invalid(
            node.validate(&json!([{"name": "ok"}, {"name": 123}])),
            "name",
            "Must be String",
        );
        assert_invalid(node.validate(&json!({"name": "x"})), "test", "Must be an Array");
    }

    #[test]
    fn array_stops_at_first_failing_element() {
        let node = SchemaNode::with_block("test", ScalarType::Array, ParamOptions::default(), |p| {
            p.param("name", ScalarType::String);
        })
        .unwrap();
        match node.validate(&json!([{"name": 1}, {"name": 2}])) {
            Err(ParamError::Invalid { value, .. }) => assert_eq!(value, json!(1)),
            other => panic!("Expected Invalid, got: {other:?}"),
        }
    }

    #[test]
    fn struct_rejects_non_objects() {
        let schema = Schema::define(|p| {
            p.param("name", ScalarType::String);
        })
        .unwrap();
        assert_invalid(schema.validate(&json!("Peter")), "", "Must be an Object");
    }

    #[test]
    fn allow_nil_skips_value_checks() {
        let schema = Schema::define(|p| {
            p.param("nickname", ScalarType::String).allow_nil(true);
            p.param("name", ScalarType::String);
        })
        .unwrap();
        schema.validate(&json!({"nickname": null})).unwrap();
        assert_invalid(schema.validate(&json!({"name": null})), "name", "Must be String");

        let lenient = ValidationConfig {
            allow_nil_by_default: true,
            ..ValidationConfig::default()
        };
        schema.validate_with(&json!({"name": null}), &lenient).unwrap();
    }

    #[test]
    fn presence_and_value_switches() {
        let schema = Schema::define(|p| {
            p.param("name", ScalarType::String).required(true);
        })
        .unwrap();
        let no_presence = ValidationConfig {
            validate_presence: false,
            ..ValidationConfig::default()
        };
        schema.validate_with(&json!({}), &no_presence).unwrap();

        let no_values = ValidationConfig {
            validate_value: false,
            ..ValidationConfig::default()
        };
        schema.validate_with(&json!({"name": 1}), &no_values).unwrap();
    }

    #[test]
    fn array_of_node_validates_elements_against_it() {
        let point = Schema::define(|p| {
            p.param("x", TypeSpec::number());
        })
        .unwrap();
        let points = SchemaNode::new("points", array_of(&point), ParamOptions::default()).unwrap();
        points.validate(&json!([{"x": "1"}, {"x": "2"}])).unwrap();
        assert_invalid(points.validate(&json!([{"x": "01"}])), "x", "Must be a number");
    }

    #[test]
    fn array_of_scalars_attributes_to_the_sequence() {
        let tags =
            SchemaNode::new("tags", array_of(ScalarType::String), ParamOptions::default()).unwrap();
        tags.validate(&json!(["a", "b"])).unwrap();
        assert_invalid(tags.validate(&json!(["a", 2])), "tags", "Must be String");
    }
}
