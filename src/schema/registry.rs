//! Schema loading: a single pre-pass over the schema document that
//! registers every `$id`-declared resource, `$anchor`, and `$dynamicAnchor`,
//! and checks keyword shapes fail-fast. Grounded on the loader pass in the
//! `ujson` schema loader (`resolve_id`/`split_uri`/vocabulary `load`)
//! this crate's validator descends from.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;
use url::Url;

use crate::error::SchemaError;
use crate::pointer::Pointer;
use crate::value::Value;

/// The synthetic base URI assigned to a schema document that declares no
/// top-level `$id` and was not given one by the caller.
pub const DEFAULT_BASE_URI: &str = "https://jschema.invalid/root";

#[derive(Default)]
pub(crate) struct Registry {
    docs: HashMap<String, Arc<Value>>,
    anchors: HashMap<String, HashMap<String, Pointer>>,
    dynamic_anchors: HashMap<String, HashMap<String, Pointer>>,
}

impl Registry {
    pub(crate) fn load(&mut self, root: Value, base_uri: impl Into<String>) -> Result<String, SchemaError> {
        let root = Arc::new(root);
        let base_uri = base_uri.into();
        let base_uri = if let Value::Object(obj) = root.as_ref() {
            match obj.get("$id") {
                Some(id) => {
                    let id_str = id.str().map_err(|_| {
                        SchemaError::new(&base_uri, "", "$id must be a string")
                    })?;
                    resolve_uri(&base_uri, id_str)?
                }
                None => base_uri,
            }
        } else {
            base_uri
        };
        self.docs.insert(base_uri.clone(), Arc::clone(&root));
        self.walk(&root, root.as_ref(), Pointer::root(), &base_uri)?;
        Ok(base_uri)
    }

    pub(crate) fn register_external(&mut self, uri: impl Into<String>, doc: Value) -> Result<(), SchemaError> {
        let uri = uri.into();
        let root = Arc::new(doc);
        self.docs.insert(uri.clone(), Arc::clone(&root));
        self.walk(&root, root.as_ref(), Pointer::root(), &uri)
    }

    fn walk<'v>(
        &mut self,
        root: &'v Arc<Value>,
        node: &'v Value,
        at: Pointer,
        base: &str,
    ) -> Result<(), SchemaError> {
        let obj = match node {
            Value::Boolean(_) => return Ok(()),
            Value::Object(obj) => obj,
            _ => {
                return Err(SchemaError::new(base, at.to_pointer_string(), "schema node must be a boolean or object"))
            }
        };

        let mut base = base.to_string();
        if let Some(id_val) = obj.get("$id") {
            let id_str = id_val
                .str()
                .map_err(|_| SchemaError::new(&base, at.to_pointer_string(), "$id must be a string"))?;
            base = resolve_uri(&base, id_str)?;
            debug!(uri = %base, pointer = %at.to_pointer_string(), "registered schema resource");
            self.docs.insert(base.clone(), Arc::clone(root));
        }
        if let Some(anchor_val) = obj.get("$anchor") {
            let name = anchor_val
                .str()
                .map_err(|_| SchemaError::new(&base, at.to_pointer_string(), "$anchor must be a string"))?;
            self.anchors.entry(base.clone()).or_default().insert(name.to_string(), at.clone());
        }
        if let Some(dyn_val) = obj.get("$dynamicAnchor") {
            let name = dyn_val
                .str()
                .map_err(|_| SchemaError::new(&base, at.to_pointer_string(), "$dynamicAnchor must be a string"))?;
            debug!(uri = %base, anchor = name, "registered dynamic anchor");
            self.dynamic_anchors.entry(base.clone()).or_default().insert(name.to_string(), at.clone());
            self.anchors.entry(base.clone()).or_default().insert(name.to_string(), at.clone());
        }

        check_shape(obj, &base, &at)?;

        for (child, child_at) in subschema_children(obj, &at) {
            self.walk(root, child, child_at, &base)?;
        }
        Ok(())
    }

    pub(crate) fn lookup(&self, base: &str, fragment: &str) -> Result<(Arc<Value>, Pointer), SchemaError> {
        let doc = self
            .docs
            .get(base)
            .cloned()
            .ok_or_else(|| SchemaError::new(base, fragment, "unresolved schema resource"))?;
        if fragment.is_empty() || fragment.starts_with('/') {
            let ptr = Pointer::parse(fragment).map_err(|e| SchemaError::new(base, fragment, e.to_string()))?;
            Ok((doc, ptr))
        } else {
            let ptr = self
                .anchors
                .get(base)
                .and_then(|m| m.get(fragment))
                .cloned()
                .ok_or_else(|| SchemaError::new(base, fragment, format!("unknown anchor '{fragment}'")))?;
            Ok((doc, ptr))
        }
    }

    pub(crate) fn resolve(&self, current_base: &str, reference: &str) -> Result<(Arc<Value>, Pointer, String), SchemaError> {
        let (base, fragment) = resolve_uri_with_fragment(current_base, reference)?;
        let (doc, ptr) = self.lookup(&base, &fragment)?;
        Ok((doc, ptr, base))
    }

    /// Resolves `$dynamicRef`, preferring the outermost scope in
    /// `dynamic_scope` that declares a matching `$dynamicAnchor`, falling
    /// back to lexical `$ref` resolution otherwise.
    pub(crate) fn resolve_dynamic(
        &self,
        current_base: &str,
        reference: &str,
        dynamic_scope: &[String],
    ) -> Result<(Arc<Value>, Pointer, String), SchemaError> {
        let (base, fragment) = resolve_uri_with_fragment(current_base, reference)?;
        if !fragment.is_empty() && !fragment.starts_with('/') {
            for scope_base in dynamic_scope {
                if let Some(ptr) = self.dynamic_anchors.get(scope_base).and_then(|m| m.get(&fragment)) {
                    let doc = self.docs.get(scope_base).cloned().ok_or_else(|| {
                        SchemaError::new(scope_base, &fragment, "unresolved schema resource")
                    })?;
                    return Ok((doc, ptr.clone(), scope_base.clone()));
                }
            }
        }
        let (doc, ptr) = self.lookup(&base, &fragment)?;
        Ok((doc, ptr, base))
    }
}

/// Resolves a `$id` value against the current base URI, the same
/// transform [`Registry::load`]'s pre-pass applies, exposed for the
/// evaluator's own base-URI tracking as it descends the schema tree.
pub(crate) fn resolve_id(base: &str, id: &str) -> Result<String, SchemaError> {
    resolve_uri(base, id)
}

fn resolve_uri(base: &str, relative: &str) -> Result<String, SchemaError> {
    let base_url = Url::parse(base).map_err(|e| SchemaError::new(base, "", format!("invalid base uri: {e}")))?;
    let mut joined = base_url
        .join(relative)
        .map_err(|e| SchemaError::new(base, "", format!("invalid uri reference '{relative}': {e}")))?;
    joined.set_fragment(None);
    Ok(joined.to_string())
}

fn resolve_uri_with_fragment(base: &str, relative: &str) -> Result<(String, String), SchemaError> {
    let base_url = Url::parse(base).map_err(|e| SchemaError::new(base, "", format!("invalid base uri: {e}")))?;
    let joined = base_url
        .join(relative)
        .map_err(|e| SchemaError::new(base, "", format!("invalid uri reference '{relative}': {e}")))?;
    let fragment = joined.fragment().unwrap_or("").to_string();
    let mut without_fragment = joined;
    without_fragment.set_fragment(None);
    Ok((without_fragment.to_string(), fragment))
}

/// Enumerates the direct subschema-valued children of a schema object, for
/// both the loader pre-pass and (conceptually) the validator's dispatch.
pub(crate) fn subschema_children<'v>(obj: &'v crate::value::Object, at: &Pointer) -> Vec<(&'v Value, Pointer)> {
    let mut out = Vec::new();
    let single = [
        "additionalProperties",
        "propertyNames",
        "items",
        "contains",
        "not",
        "if",
        "then",
        "else",
        "unevaluatedItems",
        "unevaluatedProperties",
    ];
    for key in single {
        if let Some(v) = obj.get(key) {
            out.push((v, at.child(key)));
        }
    }
    let array_of_schemas = ["allOf", "anyOf", "oneOf", "prefixItems"];
    for key in array_of_schemas {
        if let Some(Value::Array(items)) = obj.get(key) {
            let base = at.child(key);
            for (i, item) in items.iter().enumerate() {
                out.push((item, base.child_index(i)));
            }
        }
    }
    let object_of_schemas = ["properties", "patternProperties", "$defs", "dependentSchemas"];
    for key in object_of_schemas {
        if let Some(Value::Object(fields)) = obj.get(key) {
            let base = at.child(key);
            for (k, v) in fields.iter() {
                out.push((v, base.child(k)));
            }
        }
    }
    out
}

fn check_shape(obj: &crate::value::Object, base: &str, at: &Pointer) -> Result<(), SchemaError> {
    let err = |msg: &str| Err(SchemaError::new(base, at.to_pointer_string(), msg));

    for key in ["properties", "patternProperties", "$defs", "dependentSchemas"] {
        if let Some(v) = obj.get(key) {
            if !matches!(v, Value::Object(_)) {
                return err(&format!("'{key}' must be an object"));
            }
        }
    }
    for key in ["allOf", "anyOf", "oneOf"] {
        if let Some(v) = obj.get(key) {
            match v {
                Value::Array(items) if !items.is_empty() => {}
                _ => return err(&format!("'{key}' must be a non-empty array of schemas")),
            }
        }
    }
    if let Some(v) = obj.get("prefixItems") {
        match v {
            Value::Array(items) if !items.is_empty() => {}
            _ => return err("'prefixItems' must be a non-empty array of schemas"),
        }
    }
    if let Some(v) = obj.get("required") {
        match v {
            Value::Array(items) => {
                if !items.iter().all(|i| matches!(i, Value::String(_))) {
                    return err("'required' must be an array of strings");
                }
                let mut seen = std::collections::HashSet::new();
                for i in items {
                    if !seen.insert(i.str().unwrap()) {
                        return err("'required' must not contain duplicate strings");
                    }
                }
            }
            _ => return err("'required' must be an array of strings"),
        }
    }
    if let Some(v) = obj.get("type") {
        let valid_names = |s: &str| {
            matches!(
                s,
                "null" | "boolean" | "object" | "array" | "number" | "integer" | "string"
            )
        };
        let ok = match v {
            Value::String(s) => valid_names(s),
            Value::Array(items) => items.iter().all(|i| matches!(i, Value::String(s) if valid_names(s))),
            _ => false,
        };
        if !ok {
            return err("'type' must be a valid type name or array of valid type names");
        }
    }
    Ok(())
}
