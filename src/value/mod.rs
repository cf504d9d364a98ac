//! The tagged-variant value model every other module in the crate builds
//! on: [`Value`] is a sum over the seven JSON types plus an `Invalid`
//! sentinel that a failed parse returns instead of a partial tree.

mod format;
mod number;
mod object;

pub use format::Format;
pub use number::{Decimal, DecimalBackend, Number, NumericBackend};
pub use object::Object;

use std::fmt;
use std::ops::{Index, IndexMut};

use crate::error::UsageError;

/// The type tag of a [`Value`]. Distinct from `integer`-vs-`number` at the
/// schema level; a `Value::Number` always has `Type::Number` here, and the
/// `type: integer` schema keyword additionally checks [`Number::is_integer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Invalid,
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Type::Invalid => "invalid",
            Type::Null => "null",
            Type::Boolean => "boolean",
            Type::Number => "number",
            Type::String => "string",
            Type::Array => "array",
            Type::Object => "object",
        };
        f.write_str(s)
    }
}

/// A JSON value.
///
/// `Value::Invalid` is never produced by a successful operation; it is the
/// sentinel [`crate::parser::Parser`] returns in place of a partial tree
/// when parsing fails.
#[derive(Debug, Clone)]
pub enum Value {
    Invalid,
    Null,
    Boolean(bool),
    Number(Number),
    String(String),
    Array(Vec<Value>),
    Object(Object),
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl Value {
    pub fn type_of(&self) -> Type {
        match self {
            Value::Invalid => Type::Invalid,
            Value::Null => Type::Null,
            Value::Boolean(_) => Type::Boolean,
            Value::Number(_) => Type::Number,
            Value::String(_) => Type::String,
            Value::Array(_) => Type::Array,
            Value::Object(_) => Type::Object,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Value::Array(_) | Value::Object(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Value::Invalid)
    }

    pub fn object<K: Into<String>, I: IntoIterator<Item = (K, Value)>>(pairs: I) -> Value {
        let obj: Object = pairs.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Value::Object(obj)
    }

    pub fn array<I: IntoIterator<Item = Value>>(items: I) -> Value {
        Value::Array(items.into_iter().collect())
    }

    fn type_error(&self, expected: Type) -> UsageError {
        UsageError::WrongType { expected, found: self.type_of() }
    }

    pub fn bool(&self) -> Result<bool, UsageError> {
        match self {
            Value::Boolean(b) => Ok(*b),
            other => Err(other.type_error(Type::Boolean)),
        }
    }

    pub fn num(&self) -> Result<&Number, UsageError> {
        match self {
            Value::Number(n) => Ok(n),
            other => Err(other.type_error(Type::Number)),
        }
    }

    pub fn str(&self) -> Result<&str, UsageError> {
        match self {
            Value::String(s) => Ok(s),
            other => Err(other.type_error(Type::String)),
        }
    }

    pub fn array_items(&self) -> Result<&[Value], UsageError> {
        match self {
            Value::Array(items) => Ok(items),
            other => Err(other.type_error(Type::Array)),
        }
    }

    pub fn array_items_mut(&mut self) -> Result<&mut Vec<Value>, UsageError> {
        match self {
            Value::Array(items) => Ok(items),
            other => Err(other.type_error(Type::Array)),
        }
    }

    pub fn object_pairs(&self) -> Result<&Object, UsageError> {
        match self {
            Value::Object(obj) => Ok(obj),
            other => Err(other.type_error(Type::Object)),
        }
    }

    pub fn object_pairs_mut(&mut self) -> Result<&mut Object, UsageError> {
        match self {
            Value::Object(obj) => Ok(obj),
            other => Err(other.type_error(Type::Object)),
        }
    }

    /// `true` if this is an object with a member named `key` (any
    /// occurrence, under duplicate-key retention).
    pub fn has(&self, key: &str) -> bool {
        matches!(self, Value::Object(obj) if obj.has(key))
    }

    /// Appends `item` to an array. Panics (via the `UsageError`, which the
    /// caller must have already ruled out by construction) is not this
    /// method's contract: callers on a non-array get an error instead.
    pub fn append(&mut self, item: Value) -> Result<(), UsageError> {
        self.array_items_mut()?.push(item);
        Ok(())
    }

    /// Removes the array element at `index`, shifting later elements down.
    pub fn remove_index(&mut self, index: usize) -> Result<Value, UsageError> {
        let items = self.array_items_mut()?;
        if index >= items.len() {
            return Err(UsageError::IndexOutOfBounds { index, len: items.len() });
        }
        Ok(items.remove(index))
    }

    /// Removes every pair matching `key` from an object.
    pub fn remove_key(&mut self, key: &str) -> Result<Option<Value>, UsageError> {
        Ok(self.object_pairs_mut()?.remove(key))
    }

    pub fn describe(&self, format: Format) -> String {
        format::describe(self, format)
    }

    /// General JSON equality: same tag, deep-equal payload, object member
    /// order significant. Schema keywords (`enum`, `const`, `uniqueItems`)
    /// use [`Value::eq_for_schema`] instead, per the crate's deliberate
    /// object-equality split (see design notes).
    pub fn eq_for_schema(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Object(a), Value::Object(b)) => a.eq_as_multiset(b),
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.eq_for_schema(y))
            }
            _ => self == other,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Invalid, Value::Invalid) => true,
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Number(Number::from_i64(v))
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Number(Number::from_i64(v as i64))
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Number(Number::from_u64(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(Number::from_f64(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}

/// Read access by array index. Out-of-bounds reads panic, matching
/// standard container-indexing conventions; use [`Value::array_items`]
/// for a checked read.
impl Index<usize> for Value {
    type Output = Value;
    fn index(&self, index: usize) -> &Value {
        &self.array_items().expect("indexed a non-array Value")[index]
    }
}

/// Write access by array index. Growing the array with `null` for
/// `index >= len` matches the design notes' mutable-index contract.
impl IndexMut<usize> for Value {
    fn index_mut(&mut self, index: usize) -> &mut Value {
        if !matches!(self, Value::Array(_)) {
            *self = Value::Array(Vec::new());
        }
        let items = self.array_items_mut().unwrap();
        if index >= items.len() {
            items.resize_with(index + 1, || Value::Null);
        }
        &mut items[index]
    }
}

/// Read access by object key. Missing keys panic; use
/// [`Value::object_pairs`] + [`Object::get`] for a checked read.
impl Index<&str> for Value {
    type Output = Value;
    fn index(&self, key: &str) -> &Value {
        self.object_pairs()
            .ok()
            .and_then(|obj| obj.get(key))
            .expect("missing key or non-object Value")
    }
}

/// Write access by object key. Inserts `null` under `key` first if
/// missing, matching the mutable-index contract.
impl IndexMut<&str> for Value {
    fn index_mut(&mut self, key: &str) -> &mut Value {
        if !matches!(self, Value::Object(_)) {
            *self = Value::Object(Object::new());
        }
        let obj = self.object_pairs_mut().unwrap();
        if !obj.has(key) {
            obj.push(key, Value::Null);
        }
        obj.get_mut(key).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_variant_accessor_fails_with_type_mismatch() {
        let v = Value::from(1i64);
        assert_eq!(
            v.str().unwrap_err(),
            UsageError::WrongType { expected: Type::String, found: Type::Number }
        );
    }

    #[test]
    fn mutable_array_index_grows_with_nulls() {
        let mut v = Value::array(Vec::<Value>::new());
        v[2] = Value::from(7i64);
        assert_eq!(v.array_items().unwrap().len(), 3);
        assert_eq!(v[0], Value::Null);
        assert_eq!(v[2], Value::from(7i64));
    }

    #[test]
    fn mutable_object_index_inserts_null_for_missing_key() {
        let mut v = Value::object(Vec::<(&str, Value)>::new());
        v["x"] = Value::from(true);
        assert_eq!(v["x"], Value::from(true));
    }

    #[test]
    fn numeric_equality_crosses_integer_and_real() {
        assert_eq!(Value::from(4i64), Value::from(4.0f64));
    }

    #[test]
    fn schema_equality_treats_objects_as_multisets_general_equality_does_not() {
        let a = Value::object([("x", Value::from(1i64)), ("y", Value::from(2i64))]);
        let b = Value::object([("y", Value::from(2i64)), ("x", Value::from(1i64))]);
        assert!(a.eq_for_schema(&b));
        assert_ne!(a, b);
    }
}
