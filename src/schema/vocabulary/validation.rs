//! The `validation` vocabulary: `type`, `enum`, `const`, and the numeric /
//! string / array / object bound keywords. Each check is a pure function
//! returning `Err(message)` on violation, called from the evaluator once
//! per keyword present on a schema object.

use crate::value::{Number, NumericBackend, Object, Value};

pub fn type_name_matches(instance: &Value, name: &str) -> bool {
    match name {
        "null" => instance.is_null(),
        "boolean" => matches!(instance, Value::Boolean(_)),
        "object" => matches!(instance, Value::Object(_)),
        "array" => matches!(instance, Value::Array(_)),
        "string" => matches!(instance, Value::String(_)),
        "number" => matches!(instance, Value::Number(_)),
        "integer" => matches!(instance, Value::Number(n) if n.is_integer()),
        _ => false,
    }
}

pub fn check_type(type_val: &Value, instance: &Value) -> Result<(), String> {
    let names: Vec<&str> = match type_val {
        Value::String(s) => vec![s.as_str()],
        Value::Array(items) => items.iter().filter_map(|v| v.str().ok()).collect(),
        _ => return Ok(()),
    };
    if names.iter().any(|name| type_name_matches(instance, name)) {
        Ok(())
    } else {
        Err(format!("expected type {}, found {}", names.join(" or "), instance.type_of()))
    }
}

pub fn check_enum(enum_val: &Value, instance: &Value) -> Result<(), String> {
    let items = enum_val.array_items().map_err(|_| "'enum' must be an array".to_string())?;
    if items.iter().any(|candidate| candidate.eq_for_schema(instance)) {
        Ok(())
    } else {
        Err("value is not one of the enumerated values".to_string())
    }
}

pub fn check_const(const_val: &Value, instance: &Value) -> Result<(), String> {
    if const_val.eq_for_schema(instance) {
        Ok(())
    } else {
        Err("value does not equal the constant".to_string())
    }
}

pub fn check_minimum(n: &Number, bound: &Number) -> Result<(), String> {
    if n >= bound {
        Ok(())
    } else {
        Err(format!("{} is less than minimum {}", n.to_json_text(), bound.to_json_text()))
    }
}

pub fn check_maximum(n: &Number, bound: &Number) -> Result<(), String> {
    if n <= bound {
        Ok(())
    } else {
        Err(format!("{} is greater than maximum {}", n.to_json_text(), bound.to_json_text()))
    }
}

pub fn check_exclusive_minimum(n: &Number, bound: &Number) -> Result<(), String> {
    if n > bound {
        Ok(())
    } else {
        Err(format!("{} is not greater than exclusive minimum {}", n.to_json_text(), bound.to_json_text()))
    }
}

pub fn check_exclusive_maximum(n: &Number, bound: &Number) -> Result<(), String> {
    if n < bound {
        Ok(())
    } else {
        Err(format!("{} is not less than exclusive maximum {}", n.to_json_text(), bound.to_json_text()))
    }
}

pub fn check_multiple_of(backend: &dyn NumericBackend, n: &Number, of: &Number) -> Result<(), String> {
    if backend.multiple_of(n, of) {
        Ok(())
    } else {
        Err(format!("{} is not a multiple of {}", n.to_json_text(), of.to_json_text()))
    }
}

fn as_usize_bound(bound: &Number) -> usize {
    bound.as_f64().max(0.0) as usize
}

pub fn check_min_length(s: &str, bound: &Number) -> Result<(), String> {
    let len = s.chars().count();
    if len >= as_usize_bound(bound) {
        Ok(())
    } else {
        Err(format!("length {len} is less than minLength {}", as_usize_bound(bound)))
    }
}

pub fn check_max_length(s: &str, bound: &Number) -> Result<(), String> {
    let len = s.chars().count();
    if len <= as_usize_bound(bound) {
        Ok(())
    } else {
        Err(format!("length {len} is greater than maxLength {}", as_usize_bound(bound)))
    }
}

pub fn check_pattern(s: &str, pattern: &str) -> Result<(), String> {
    let re = super::regex_cache::compiled(pattern).map_err(|e| format!("invalid pattern '{pattern}': {e}"))?;
    if re.is_match(s) {
        Ok(())
    } else {
        Err(format!("\"{s}\" does not match pattern '{pattern}'"))
    }
}

pub fn check_min_items(len: usize, bound: &Number) -> Result<(), String> {
    if len >= as_usize_bound(bound) {
        Ok(())
    } else {
        Err(format!("array has {len} items, fewer than minItems {}", as_usize_bound(bound)))
    }
}

pub fn check_max_items(len: usize, bound: &Number) -> Result<(), String> {
    if len <= as_usize_bound(bound) {
        Ok(())
    } else {
        Err(format!("array has {len} items, more than maxItems {}", as_usize_bound(bound)))
    }
}

pub fn check_unique_items(items: &[Value]) -> Result<(), String> {
    for i in 0..items.len() {
        for j in (i + 1)..items.len() {
            if items[i].eq_for_schema(&items[j]) {
                return Err(format!("items at indices {i} and {j} are duplicates"));
            }
        }
    }
    Ok(())
}

pub fn check_min_properties(obj: &Object, bound: &Number) -> Result<(), String> {
    let len = obj.distinct_keys().len();
    if len >= as_usize_bound(bound) {
        Ok(())
    } else {
        Err(format!("object has {len} properties, fewer than minProperties {}", as_usize_bound(bound)))
    }
}

pub fn check_max_properties(obj: &Object, bound: &Number) -> Result<(), String> {
    let len = obj.distinct_keys().len();
    if len <= as_usize_bound(bound) {
        Ok(())
    } else {
        Err(format!("object has {len} properties, more than maxProperties {}", as_usize_bound(bound)))
    }
}

pub fn check_required(obj: &Object, required: &[&str]) -> Result<(), String> {
    let missing: Vec<&str> = required.iter().filter(|k| !obj.has(k)).copied().collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(format!("missing required properties: {}", missing.join(", ")))
    }
}

/// `dependentRequired`: for each key present in `obj` that also appears in
/// `dependent`, every string in its associated array must also be present.
pub fn check_dependent_required(obj: &Object, dependent: &Object) -> Result<(), String> {
    let mut missing = Vec::new();
    for (key, deps) in dependent.iter() {
        if !obj.has(key) {
            continue;
        }
        if let Ok(items) = deps.array_items() {
            for dep in items {
                if let Ok(dep_key) = dep.str() {
                    if !obj.has(dep_key) {
                        missing.push(format!("'{key}' requires '{dep_key}'"));
                    }
                }
            }
        }
    }
    if missing.is_empty() {
        Ok(())
    } else {
        Err(missing.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_type_rejects_fractional_number() {
        let n = Value::from(1.5f64);
        assert!(check_type(&Value::from("integer"), &n).is_err());
    }

    #[test]
    fn enum_uses_schema_equality_for_objects() {
        let enum_val = Value::array([Value::object([("x", Value::from(1i64)), ("y", Value::from(2i64))])]);
        let instance = Value::object([("y", Value::from(2i64)), ("x", Value::from(1i64))]);
        assert!(check_enum(&enum_val, &instance).is_ok());
    }

    #[test]
    fn unique_items_flags_schema_equal_duplicates() {
        let items = vec![Value::from(1i64), Value::from(1.0f64)];
        assert!(check_unique_items(&items).is_err());
    }

    #[test]
    fn multiple_of_defers_to_the_given_backend() {
        struct AlwaysMultiple;
        impl NumericBackend for AlwaysMultiple {
            fn multiple_of(&self, _n: &Number, _of: &Number) -> bool {
                true
            }
        }
        let n = Number::from_i64(7);
        let of = Number::from_i64(4);
        assert!(check_multiple_of(&crate::value::DecimalBackend, &n, &of).is_err());
        assert!(check_multiple_of(&AlwaysMultiple, &n, &of).is_ok());
    }
}
