use std::sync::Arc;

use jschema::value::{Number, NumericBackend};
use jschema::{parse_str, Schema, Value, ValidationOptions};

fn schema(json: &str) -> Schema {
    Schema::compile(parse_str(json).unwrap()).unwrap()
}

#[test]
fn unevaluated_properties_sees_through_a_ref_inside_all_of() {
    let s = schema(
        r##"{
            "$defs": {"named": {"type": "object", "properties": {"name": {"type": "string"}}}},
            "allOf": [{"$ref": "#/$defs/named"}],
            "unevaluatedProperties": false
        }"##,
    );
    let covered = Value::object([("name", Value::from("ok"))]);
    assert!(s.validate(&covered).valid);

    let extra = Value::object([("name", Value::from("ok")), ("extra", Value::from(1i64))]);
    assert!(!s.validate(&extra).valid);
}

#[test]
fn validating_a_schema_with_nested_combinators_twice_gives_the_same_output() {
    let s = schema(
        r##"{
            "$defs": {"even": {"type": "integer", "multipleOf": 2}},
            "oneOf": [{"$ref": "#/$defs/even"}, {"maximum": 0}],
            "allOf": [{"type": "number"}]
        }"##,
    );
    let instance = Value::from(4i64);
    let first = s.validate(&instance);
    let second = s.validate(&instance);
    assert_eq!(first, second);
}

#[test]
fn an_externally_registered_document_is_reachable_by_ref() {
    let mut s = schema(r#"{"$ref": "https://example.com/ext.json"}"#);
    s.register_external("https://example.com/ext.json", parse_str(r#"{"type": "string"}"#).unwrap())
        .unwrap();
    assert!(s.validate(&Value::from("ok")).valid);
    assert!(!s.validate(&Value::from(5i64)).valid);
}

#[test]
fn strict_meta_rejects_an_unrecognized_schema_uri_only_when_enabled() {
    let s = schema(r#"{"$schema": "https://json-schema.org/draft/1999/nonexistent", "type": "string"}"#);

    let lenient = s.validate(&Value::from("x"));
    assert!(lenient.valid);

    let strict_opts = ValidationOptions { strict_meta: true, ..ValidationOptions::default() };
    let strict = s.validate_with(&Value::from("x"), &strict_opts);
    assert!(!strict.valid);
}

#[test]
fn multiple_of_handles_decimal_fractions_exactly() {
    let s = schema(r#"{"multipleOf": 0.01}"#);
    let instance = parse_str("19.99").unwrap();
    assert!(s.validate(&instance).valid);
}

#[test]
fn quit_on_first_error_stops_after_the_first_failing_keyword() {
    let s = schema(r#"{"type": "integer", "minimum": 5}"#);
    let instance = Value::from(-3.5f64);

    let all_errors = s.validate(&instance);
    assert_eq!(all_errors.errors.len(), 2);

    let opts = ValidationOptions { quit_on_first_error: true, ..ValidationOptions::default() };
    let first_only = s.validate_with(&instance, &opts);
    assert_eq!(first_only.errors.len(), 1);
}

#[test]
fn a_custom_numeric_backend_overrides_multiple_of() {
    struct EverythingIsMultiple;
    impl NumericBackend for EverythingIsMultiple {
        fn multiple_of(&self, _n: &Number, _of: &Number) -> bool {
            true
        }
    }
    let s = schema(r#"{"multipleOf": 4}"#);
    let instance = Value::from(7i64);
    assert!(!s.validate(&instance).valid);

    let opts = ValidationOptions {
        numeric_backend: Some(Arc::new(EverythingIsMultiple)),
        ..ValidationOptions::default()
    };
    assert!(s.validate_with(&instance, &opts).valid);
}

#[test]
fn an_unresolved_ref_falls_back_to_the_configured_callback() {
    let s = schema(r#"{"$ref": "https://example.com/missing.json"}"#);
    let opts = ValidationOptions {
        on_unresolved_ref: Some(Arc::new(|_uri: &str| Some(parse_str(r#"{"type": "integer"}"#).unwrap()))),
        ..ValidationOptions::default()
    };
    assert!(s.validate_with(&Value::from(5i64), &opts).valid);
    assert!(!s.validate_with(&Value::from("x"), &opts).valid);
}
