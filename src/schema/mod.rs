//! JSON Schema (draft 2020-12) loading and validation.
//!
//! [`Schema::compile`] performs the one-pass load described in the design
//! notes (registering `$id` resources, `$anchor`/`$dynamicAnchor`
//! fragments, and checking keyword shapes fail-fast); [`Schema::validate`]
//! walks the loaded schema against an instance and returns a structured
//! [`OutputUnit`] rather than a `Result`, since validation failures are
//! routine, not exceptional.

mod context;
mod evaluator;
mod registry;
mod vocabulary;

pub use context::ValidationOptions;
pub use output::OutputUnit;

mod output;

use tracing::info_span;

use crate::error::SchemaError;
use crate::value::Value;
use context::Context;
use registry::{Registry, DEFAULT_BASE_URI};

/// A loaded, ready-to-validate JSON Schema document.
pub struct Schema {
    registry: Registry,
    root_uri: String,
}

impl Schema {
    /// Loads `root` as a schema document, using its own `$id` (if any) or
    /// a synthetic base URI.
    pub fn compile(root: Value) -> Result<Schema, SchemaError> {
        Schema::compile_with_uri(root, DEFAULT_BASE_URI)
    }

    /// Loads `root` as a schema document, using `uri` as its base when it
    /// declares no `$id` of its own (a declared `$id` still wins, per RFC
    /// 3986 resolution against `uri`).
    pub fn compile_with_uri(root: Value, uri: impl Into<String>) -> Result<Schema, SchemaError> {
        let uri = uri.into();
        let span = info_span!("schema_load", uri = %uri);
        let _guard = span.enter();
        let mut registry = Registry::default();
        let root_uri = registry.load(root, uri)?;
        Ok(Schema { registry, root_uri })
    }

    /// Registers an additional schema document by URI, resolvable by
    /// `$ref`/`$dynamicRef` but not itself validated against.
    pub fn register_external(&mut self, uri: impl Into<String>, doc: Value) -> Result<(), SchemaError> {
        self.registry.register_external(uri, doc)
    }

    pub fn root_uri(&self) -> &str {
        &self.root_uri
    }

    pub fn validate(&self, instance: &Value) -> OutputUnit {
        self.validate_with(instance, &ValidationOptions::default())
    }

    pub fn validate_with(&self, instance: &Value, options: &ValidationOptions) -> OutputUnit {
        let span = info_span!("schema_validate", uri = %self.root_uri);
        let _guard = span.enter();
        let root = self
            .registry
            .lookup(&self.root_uri, "")
            .ok()
            .and_then(|(doc, ptr)| ptr.resolve(&doc).ok().cloned());
        let root = match root {
            Some(v) => v,
            None => return OutputUnit::invalid("", "", "schema root could not be located"),
        };
        let mut ctx = Context::new(&self.registry, options, &self.root_uri);
        evaluator::validate_node(&mut ctx, &root, instance).output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(json: &str) -> Schema {
        let v = crate::parse_str(json).unwrap();
        Schema::compile(v).unwrap()
    }

    #[test]
    fn type_keyword_rejects_wrong_type() {
        let s = schema(r#"{"type":"integer"}"#);
        let out = s.validate(&Value::from("x"));
        assert!(!out.valid);
    }

    #[test]
    fn unevaluated_properties_false_rejects_unknown_property() {
        let s = schema(r#"{"properties":{"x":{"type":"integer"}},"unevaluatedProperties":false}"#);
        let instance = Value::object([("x", Value::from(1i64)), ("y", Value::from("s"))]);
        let out = s.validate(&instance);
        assert!(!out.valid);
    }

    #[test]
    fn unevaluated_properties_allows_property_covered_by_properties() {
        let s = schema(r#"{"properties":{"x":{"type":"integer"}},"unevaluatedProperties":false}"#);
        let instance = Value::object([("x", Value::from(1i64))]);
        let out = s.validate(&instance);
        assert!(out.valid);
    }

    #[test]
    fn multiple_of_with_decimal_literal_avoids_fp_drift() {
        let s = schema(r#"{"allOf":[{"type":"integer"},{"multipleOf":0.1}]}"#);
        let instance = crate::parse_str("5").unwrap();
        let out = s.validate(&instance);
        assert!(out.valid);
    }

    #[test]
    fn ref_to_defs_resolves_and_validates() {
        let s = schema(r##"{"$defs":{"pos":{"type":"integer","minimum":0}},"$ref":"#/$defs/pos"}"##);
        assert!(s.validate(&Value::from(5i64)).valid);
        assert!(!s.validate(&Value::from(-5i64)).valid);
    }

    #[test]
    fn dynamic_ref_resolves_to_outermost_dynamic_scope() {
        let s = schema(
            r##"{
                "$id": "https://example.com/outer",
                "$dynamicAnchor": "T",
                "type": "object",
                "properties": {
                    "inner": {
                        "$id": "https://example.com/inner",
                        "$dynamicRef": "#T"
                    }
                }
            }"##,
        );
        let instance = Value::object([("inner", Value::object(Vec::<(&str, Value)>::new()))]);
        let out = s.validate(&instance);
        assert!(out.valid);
    }

    #[test]
    fn one_of_requires_exactly_one_match() {
        let s = schema(r#"{"oneOf":[{"type":"integer"},{"maximum":0}]}"#);
        assert!(s.validate(&Value::from(5i64)).valid);
        assert!(!s.validate(&Value::from(-5i64)).valid);
    }

    #[test]
    fn validating_twice_is_idempotent() {
        let s = schema(r#"{"type":"object","required":["a"]}"#);
        let instance = Value::object([("a", Value::from(1i64))]);
        let first = s.validate(&instance);
        let second = s.validate(&instance);
        assert_eq!(first, second);
    }
}
