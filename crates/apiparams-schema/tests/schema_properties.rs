//! Integration test: end-to-end behavior of built schemas.
//!
//! Exercises the public API only: definition through builder blocks and
//! declarative documents, both validation strategies, projection, node reuse
//! and merge.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use apiparams_schema::{
    array_of, Definition, DescriptorKind, Error, ParamError, ParamOptions, Predicate, ScalarType,
    Schema, SchemaError, SchemaNode, StructuralValidator, TypeSpec,
};
use proptest::prelude::*;
use serde_json::{json, Value};

fn names(nodes: &[Arc<SchemaNode>]) -> Vec<String> {
    nodes.iter().map(|n| n.name().to_string()).collect()
}

fn person_schema() -> Arc<SchemaNode> {
    Schema::define(|p| {
        p.param("name", ScalarType::String);
        p.param("address", ScalarType::Object).required(true).block(|p| {
            p.param("street", ScalarType::String).required(true);
            p.param("zip", TypeSpec::number());
        });
    })
    .expect("person schema builds")
}

#[test]
fn test_missing_required_struct_is_attributed_to_struct() {
    match person_schema().validate(&json!({"name": "Peter"})) {
        Err(ParamError::Missing { node }) => assert_eq!(node.name(), "address"),
        other => panic!("Expected Missing(address), got: {other:?}"),
    }
}

#[test]
fn test_invalid_leaf_is_attributed_to_leaf() {
    match person_schema().validate(&json!({"address": {"street": 123}})) {
        Err(ParamError::Invalid { node, value, reason }) => {
            assert_eq!(node.name(), "street");
            assert_eq!(node.path(), "address.street");
            assert_eq!(value, json!(123));
            assert_eq!(reason, "Must be String");
        }
        other => panic!("Expected Invalid(street), got: {other:?}"),
    }
}

#[test]
fn test_sequence_errors_resolve_without_index_segments() {
    let schema = Schema::define(|p| {
        p.param("people", ScalarType::Array).block(|p| {
            p.param("name", ScalarType::String);
        });
    })
    .unwrap();
    let value = json!({"people": [{"name": "ok"}, {"name": 123}]});

    match schema.validate(&value) {
        Err(ParamError::Invalid { node, .. }) => assert_eq!(node.path(), "people.name"),
        other => panic!("Expected Invalid(name), got: {other:?}"),
    }
    match StructuralValidator::new(schema).validate(&value) {
        Err(Error::Param(ParamError::Invalid { node, .. })) => {
            assert_eq!(node.path(), "people.name")
        }
        other => panic!("Expected Invalid(name), got: {other:?}"),
    }
}

#[test]
fn test_reference_reuse_shares_params() {
    let a = Schema::define(|p| {
        p.param("x", ScalarType::String);
        p.param("y", ScalarType::Integer);
    })
    .unwrap();

    let b = SchemaNode::new("b", &a, ParamOptions::default()).unwrap();
    assert_eq!(names(&b.params()), names(&a.params()));

    let c = SchemaNode::new("c", array_of(&a), ParamOptions::default()).unwrap();
    assert_eq!(c.kind(), DescriptorKind::Sequence);
    assert_eq!(names(&c.params()), names(&a.params()));
    assert!(c
        .params()
        .iter()
        .zip(a.params().iter())
        .all(|(l, r)| Arc::ptr_eq(l, r)));
}

#[test]
fn test_projection_round_trip_through_structural_engine() {
    let schema = Schema::define(|p| {
        p.param("name", ScalarType::String);
        p.param("age", TypeSpec::number());
    })
    .unwrap();
    let validator = StructuralValidator::new(Arc::clone(&schema));

    assert!(validator.violations(&json!({"name": "x", "age": "3"})).unwrap().is_empty());

    let errors = validator.violations(&json!({"name": 1, "age": "3"})).unwrap();
    assert_eq!(errors.len(), 1);
    assert!(Arc::ptr_eq(errors[0].node(), &schema.param("name").unwrap()));
}

#[test]
fn test_builder_block_runs_once() {
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&runs);
    let schema = Schema::define(move |p| {
        counter.fetch_add(1, Ordering::SeqCst);
        p.param("a", ScalarType::String);
    })
    .unwrap();

    assert_eq!(names(&schema.params()), names(&schema.params()));
    schema.validate(&json!({"a": "x"})).unwrap();
    let _ = schema.to_json_schema();
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[test]
fn test_merge_union_and_conflict() {
    let left = Schema::define(|p| {
        p.param("a", ScalarType::String);
    })
    .unwrap();
    let right = Schema::define(|p| {
        p.param("b", ScalarType::Integer);
    })
    .unwrap();
    assert_eq!(names(&left.merged(&right).unwrap().params()), vec!["a", "b"]);

    let clash = Schema::define(|p| {
        p.param("a", ScalarType::Object).block(|p| {
            p.param("inner", ScalarType::String);
        });
    })
    .unwrap();
    assert!(matches!(
        left.merged(&clash),
        Err(SchemaError::MergeConflict {
            left: DescriptorKind::Scalar,
            right: DescriptorKind::Struct,
            ..
        })
    ));
}

#[test]
fn test_unresolved_specifier_fails_at_definition() {
    let result = Schema::define(|p| {
        p.param("a", TypeSpec::symbol("nope"));
    });
    assert!(matches!(result, Err(SchemaError::Unresolved { .. })));
}

#[test]
fn test_predicate_reason_is_reported_verbatim() {
    let schema = Schema::define(|p| {
        p.param(
            "even",
            Predicate::new(|v: &Value| match v.as_i64() {
                Some(n) if n % 2 == 0 => Ok(()),
                _ => Err(format!("{v} is not even")),
            }),
        );
    })
    .unwrap();
    schema.validate(&json!({"even": 4})).unwrap();
    let err = schema.validate(&json!({"even": 3})).unwrap_err();
    assert_eq!(err.to_string(), "Invalid parameter 'even' value 3: 3 is not even");
}

#[test]
fn test_declarative_and_builder_schemas_agree() {
    let declared = Definition::from_yaml_str(
        r#"
params:
  - name: name
    type: string
  - name: address
    type: object
    required: true
    params:
      - { name: street, type: string, required: true }
      - { name: zip, type: number }
"#,
    )
    .unwrap()
    .build()
    .unwrap();

    assert_eq!(declared.to_json_schema(), person_schema().to_json_schema());
    for value in [
        json!({"name": "Peter"}),
        json!({"address": {"street": 1}}),
        json!({"address": {"street": "Main", "zip": "12"}}),
    ] {
        assert_eq!(
            declared.validate(&value).map_err(|e| e.to_string()),
            person_schema().validate(&value).map_err(|e| e.to_string()),
        );
    }
}

proptest! {
    #[test]
    fn prop_number_accepts_canonical_integers(n in 0u64..1_000_000_000) {
        let node = SchemaNode::new("n", TypeSpec::number(), ParamOptions::default()).unwrap();
        prop_assert!(node.validate(&json!(n.to_string())).is_ok());
    }

    #[test]
    fn prop_number_rejects_leading_zeros(n in 0u64..1_000_000) {
        let node = SchemaNode::new("n", TypeSpec::number(), ParamOptions::default()).unwrap();
        let padded = format!("0{n}");
        prop_assert!(node.validate(&json!(padded)).is_err());
    }

    #[test]
    fn prop_boolean_rejects_other_strings(s in "[a-zA-Z0-9]{0,8}") {
        prop_assume!(s != "true" && s != "false");
        let node = SchemaNode::new("b", TypeSpec::bool(), ParamOptions::default()).unwrap();
        prop_assert!(node.validate(&json!(s)).is_err());
    }
}
