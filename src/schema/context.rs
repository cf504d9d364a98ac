//! Per-validation state: the instance/schema path the evaluator is
//! currently descending through, the active base URI and dynamic scope
//! stack used by `$ref`/`$dynamicRef`, and the cycle guard that keeps a
//! self-referential schema from looping forever.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::pointer::Pointer;
use crate::schema::registry::Registry;
use crate::value::{DecimalBackend, NumericBackend, Value};

/// Validation-time configuration, mirroring the parser's
/// [`crate::parser::ParserOptions`] in spirit.
#[derive(Clone)]
pub struct ValidationOptions {
    /// Stop evaluating a schema object's remaining sibling keywords as
    /// soon as one fails. The failure is still recorded.
    pub quit_on_first_error: bool,
    /// Reject `$schema` values outside the recognized draft 2020-12 set
    /// instead of defaulting to its vocabularies.
    pub strict_meta: bool,
    /// Invoked when a `$ref`/`$dynamicRef` target can't be found in the
    /// registry; returning `Some(doc)` registers it as an external schema
    /// and retries resolution once. Declining (`None`) fails validation
    /// with a schema error.
    pub on_unresolved_ref: Option<Arc<dyn Fn(&str) -> Option<Value> + Send + Sync>>,
    /// Overrides exactness-sensitive numeric comparisons (`multipleOf`,
    /// `minimum`/`maximum`/`enum`/`const` on numbers). Defaults to
    /// [`DecimalBackend`] when unset.
    pub numeric_backend: Option<Arc<dyn NumericBackend + Send + Sync>>,
}

impl fmt::Debug for ValidationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationOptions")
            .field("quit_on_first_error", &self.quit_on_first_error)
            .field("strict_meta", &self.strict_meta)
            .field("on_unresolved_ref", &self.on_unresolved_ref.is_some())
            .field("numeric_backend", &self.numeric_backend.is_some())
            .finish()
    }
}

impl Default for ValidationOptions {
    fn default() -> Self {
        ValidationOptions {
            quit_on_first_error: false,
            strict_meta: false,
            on_unresolved_ref: None,
            numeric_backend: None,
        }
    }
}

/// The result of validating one schema node (boolean or object) against
/// one instance node: its verdict, the keywords it evaluated (for
/// `unevaluatedItems`/`unevaluatedProperties` in an enclosing scope), and
/// the output-unit tree to report.
pub(crate) struct NodeResult {
    pub valid: bool,
    pub output: crate::schema::output::OutputUnit,
    pub evaluated_props: HashSet<String>,
    pub evaluated_items: HashSet<usize>,
}

impl NodeResult {
    pub fn merge_evaluated(&mut self, other: &NodeResult) {
        self.evaluated_props.extend(other.evaluated_props.iter().cloned());
        self.evaluated_items.extend(other.evaluated_items.iter().cloned());
    }
}

pub(crate) struct Context<'a> {
    pub registry: &'a Registry,
    pub options: &'a ValidationOptions,
    pub instance_path: Pointer,
    pub schema_path: Pointer,
    pub current_base: String,
    pub dynamic_scope: Vec<String>,
    visiting: HashSet<(String, String)>,
}

impl<'a> Context<'a> {
    pub fn new(registry: &'a Registry, options: &'a ValidationOptions, root_uri: &str) -> Context<'a> {
        Context {
            registry,
            options,
            instance_path: Pointer::root(),
            schema_path: Pointer::root(),
            current_base: root_uri.to_string(),
            dynamic_scope: vec![root_uri.to_string()],
            visiting: HashSet::new(),
        }
    }

    /// `true` if this (schema resource, schema pointer, instance pointer)
    /// triple is already on the active call stack; the caller should treat
    /// the node as vacuously valid rather than recurse again.
    pub fn enter_visit(&mut self) -> bool {
        let key = (
            format!("{}#{}", self.current_base, self.schema_path.to_pointer_string()),
            self.instance_path.to_pointer_string(),
        );
        if self.visiting.contains(&key) {
            true
        } else {
            self.visiting.insert(key);
            false
        }
    }

    /// The numeric backend for this validation run: the caller-supplied one
    /// if configured, otherwise [`DecimalBackend`].
    pub fn numeric_backend(&self) -> &dyn NumericBackend {
        match &self.options.numeric_backend {
            Some(backend) => backend.as_ref(),
            None => &DecimalBackend,
        }
    }

    pub fn leave_visit(&mut self) {
        let key = (
            format!("{}#{}", self.current_base, self.schema_path.to_pointer_string()),
            self.instance_path.to_pointer_string(),
        );
        self.visiting.remove(&key);
    }
}
