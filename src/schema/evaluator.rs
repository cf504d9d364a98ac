//! The recursive validator: one schema node (boolean or object) evaluated
//! against one instance node, dispatching present keywords in
//! core → applicator → validation → unevaluated order per the draft
//! 2020-12 vocabulary model, and threading the instance/schema path plus
//! the evaluated-properties/evaluated-items bookkeeping `unevaluated*`
//! needs back up through the recursion.

use std::collections::HashSet;

use tracing::trace;

use crate::schema::context::{Context, NodeResult, ValidationOptions};
use crate::schema::output::OutputUnit;
use crate::schema::vocabulary::{applicator, validation as v};
use crate::value::Value;

const RECOGNIZED_SCHEMA_URIS: &[&str] = &[
    "https://json-schema.org/draft/2020-12/schema",
    "https://json-schema.org/draft/2020-12/meta/core",
    "https://json-schema.org/draft/2020-12/meta/applicator",
    "https://json-schema.org/draft/2020-12/meta/validation",
    "https://json-schema.org/draft/2020-12/meta/unevaluated",
    "https://json-schema.org/draft/2020-12/meta/format-annotation",
    "https://json-schema.org/draft/2020-12/meta/content",
    "https://json-schema.org/draft/2020-12/meta/meta-data",
];

fn cont(result: &NodeResult, ctx: &Context) -> bool {
    !ctx.options.quit_on_first_error || result.output.valid
}

fn record(result: &mut NodeResult, ctx: &mut Context, keyword: &str, outcome: Result<(), String>) {
    if let Err(msg) = outcome {
        ctx.schema_path.push(keyword);
        let unit = OutputUnit::invalid(ctx.instance_path.to_pointer_string(), ctx.schema_path.to_pointer_string(), msg);
        ctx.schema_path.pop();
        result.output.absorb(unit);
    }
}

fn leaf(valid: bool, ctx: &Context, message: Option<String>) -> NodeResult {
    let instance = ctx.instance_path.to_pointer_string();
    let keyword = ctx.schema_path.to_pointer_string();
    let output = match message {
        Some(msg) if !valid => OutputUnit::invalid(instance, keyword, msg),
        _ => OutputUnit::valid(instance, keyword),
    };
    NodeResult { valid, output, evaluated_props: HashSet::new(), evaluated_items: HashSet::new() }
}

pub(crate) fn validate_node(ctx: &mut Context, schema: &Value, instance: &Value) -> NodeResult {
    let obj = match schema {
        Value::Boolean(b) => {
            return leaf(*b, ctx, (!b).then(|| "boolean schema 'false' rejects every instance".to_string()))
        }
        Value::Object(obj) => obj,
        _ => return leaf(false, ctx, Some("schema node must be a boolean or object".to_string())),
    };

    if ctx.enter_visit() {
        return leaf(true, ctx, None);
    }

    let previous_base = ctx.current_base.clone();
    let mut base_pushed = false;
    if let Some(id_val) = obj.get("$id") {
        if let Ok(id_str) = id_val.str() {
            if let Ok(new_base) = crate::schema::registry::resolve_id(&ctx.current_base, id_str) {
                ctx.current_base = new_base.clone();
                ctx.dynamic_scope.push(new_base);
                base_pushed = true;
            }
        }
    }

    trace!(base = %ctx.current_base, schema_path = %ctx.schema_path.to_pointer_string(), "entering schema node");

    let mut result = NodeResult {
        valid: true,
        output: OutputUnit::valid(ctx.instance_path.to_pointer_string(), ctx.schema_path.to_pointer_string()),
        evaluated_props: HashSet::new(),
        evaluated_items: HashSet::new(),
    };

    if let Some(schema_uri) = obj.get("$schema") {
        if ctx.options.strict_meta {
            if let Ok(uri) = schema_uri.str() {
                if !RECOGNIZED_SCHEMA_URIS.contains(&uri) {
                    record(&mut result, ctx, "$schema", Err(format!("unrecognized $schema '{uri}'")));
                }
            }
        }
    }

    // --- core: $ref / $dynamicRef ---
    if cont(&result, ctx) {
        if let Some(ref_val) = obj.get("$ref") {
            if let Ok(ref_str) = ref_val.str() {
                apply_reference(&mut result, ctx, "$ref", ref_str, instance, false);
            }
        }
    }
    if cont(&result, ctx) {
        if let Some(ref_val) = obj.get("$dynamicRef") {
            if let Ok(ref_str) = ref_val.str() {
                apply_reference(&mut result, ctx, "$dynamicRef", ref_str, instance, true);
            }
        }
    }

    // --- applicator: allOf / anyOf / oneOf / not / if-then-else ---
    if cont(&result, ctx) {
        if let Some(Value::Array(subs)) = obj.get("allOf") {
            ctx.schema_path.push("allOf");
            for (i, sub_schema) in subs.iter().enumerate() {
                ctx.schema_path.push(i.to_string());
                let sub = validate_node(ctx, sub_schema, instance);
                ctx.schema_path.pop();
                if sub.valid {
                    result.merge_evaluated(&sub);
                }
                result.output.absorb(sub.output);
            }
            ctx.schema_path.pop();
        }
    }

    if cont(&result, ctx) {
        if let Some(Value::Array(subs)) = obj.get("anyOf") {
            ctx.schema_path.push("anyOf");
            let mut any_valid = false;
            let mut units = Vec::new();
            for (i, sub_schema) in subs.iter().enumerate() {
                ctx.schema_path.push(i.to_string());
                let sub = validate_node(ctx, sub_schema, instance);
                ctx.schema_path.pop();
                if sub.valid {
                    any_valid = true;
                    result.merge_evaluated(&sub);
                }
                units.push(sub.output);
            }
            ctx.schema_path.pop();
            if any_valid {
                for unit in units.into_iter().filter(|u| u.valid) {
                    result.output.absorb(unit);
                }
            } else {
                let mut failure = OutputUnit::invalid(
                    ctx.instance_path.to_pointer_string(),
                    ctx.schema_path.child("anyOf").to_pointer_string(),
                    "no subschema in anyOf matched",
                );
                for unit in units {
                    failure.errors.push(unit);
                }
                result.output.absorb(failure);
            }
        }
    }

    if cont(&result, ctx) {
        if let Some(Value::Array(subs)) = obj.get("oneOf") {
            ctx.schema_path.push("oneOf");
            let mut branch_results = Vec::new();
            for (i, sub_schema) in subs.iter().enumerate() {
                ctx.schema_path.push(i.to_string());
                let sub = validate_node(ctx, sub_schema, instance);
                ctx.schema_path.pop();
                branch_results.push(sub);
            }
            ctx.schema_path.pop();
            let matches: Vec<usize> = branch_results.iter().enumerate().filter(|(_, r)| r.valid).map(|(i, _)| i).collect();
            if matches.len() == 1 {
                let winner = branch_results.remove(matches[0]);
                result.merge_evaluated(&winner);
                result.output.absorb(OutputUnit::valid(
                    ctx.instance_path.to_pointer_string(),
                    ctx.schema_path.child("oneOf").to_pointer_string(),
                ));
            } else {
                let mut failure = OutputUnit::invalid(
                    ctx.instance_path.to_pointer_string(),
                    ctx.schema_path.child("oneOf").to_pointer_string(),
                    format!("expected exactly one matching subschema, found {}", matches.len()),
                );
                for branch in branch_results {
                    failure.errors.push(branch.output);
                }
                result.output.absorb(failure);
            }
        }
    }

    if cont(&result, ctx) {
        if let Some(not_schema) = obj.get("not") {
            ctx.schema_path.push("not");
            let sub = validate_node(ctx, not_schema, instance);
            ctx.schema_path.pop();
            if sub.valid {
                result.output.absorb(OutputUnit::invalid(
                    ctx.instance_path.to_pointer_string(),
                    ctx.schema_path.child("not").to_pointer_string(),
                    "instance matches the 'not' schema",
                ));
            }
        }
    }

    if cont(&result, ctx) {
        if let Some(if_schema) = obj.get("if") {
            ctx.schema_path.push("if");
            let if_result = validate_node(ctx, if_schema, instance);
            ctx.schema_path.pop();
            if if_result.valid {
                result.merge_evaluated(&if_result);
                if let Some(then_schema) = obj.get("then") {
                    ctx.schema_path.push("then");
                    let then_result = validate_node(ctx, then_schema, instance);
                    ctx.schema_path.pop();
                    if then_result.valid {
                        result.merge_evaluated(&then_result);
                    }
                    result.output.absorb(then_result.output);
                }
            } else if let Some(else_schema) = obj.get("else") {
                ctx.schema_path.push("else");
                let else_result = validate_node(ctx, else_schema, instance);
                ctx.schema_path.pop();
                if else_result.valid {
                    result.merge_evaluated(&else_result);
                }
                result.output.absorb(else_result.output);
            }
        }
    }

    let inst_obj = instance.object_pairs().ok();
    let inst_items = instance.array_items().ok();

    if cont(&result, ctx) {
        if let (Some(Value::Object(props)), Some(inst_obj)) = (obj.get("properties"), inst_obj) {
            ctx.schema_path.push("properties");
            for (key, sub_schema) in props.iter() {
                if let Some(value) = inst_obj.get(key) {
                    ctx.schema_path.push(key);
                    ctx.instance_path.push(key);
                    let sub = validate_node(ctx, sub_schema, value);
                    ctx.instance_path.pop();
                    ctx.schema_path.pop();
                    if sub.valid {
                        result.evaluated_props.insert(key.to_string());
                    }
                    result.output.absorb(sub.output);
                }
            }
            ctx.schema_path.pop();
        }
    }

    if cont(&result, ctx) {
        if let (Some(Value::Object(pattern_props)), Some(inst_obj)) = (obj.get("patternProperties"), inst_obj) {
            ctx.schema_path.push("patternProperties");
            for (key, patterns) in applicator::properties_matched_by_patterns(inst_obj, pattern_props) {
                let value = inst_obj.get(key).unwrap();
                for pattern in patterns {
                    let sub_schema = pattern_props.get(pattern).unwrap();
                    ctx.schema_path.push(pattern);
                    ctx.instance_path.push(key);
                    let sub = validate_node(ctx, sub_schema, value);
                    ctx.instance_path.pop();
                    ctx.schema_path.pop();
                    if sub.valid {
                        result.evaluated_props.insert(key.to_string());
                    }
                    result.output.absorb(sub.output);
                }
            }
            ctx.schema_path.pop();
        }
    }

    if cont(&result, ctx) {
        if let (Some(additional_schema), Some(inst_obj)) = (obj.get("additionalProperties"), inst_obj) {
            let unmatched: Vec<String> =
                applicator::unmatched_properties(inst_obj, &result.evaluated_props).into_iter().map(String::from).collect();
            ctx.schema_path.push("additionalProperties");
            for key in unmatched {
                let value = inst_obj.get(&key).unwrap();
                ctx.instance_path.push(key.clone());
                let sub = validate_node(ctx, additional_schema, value);
                ctx.instance_path.pop();
                if sub.valid {
                    result.evaluated_props.insert(key);
                }
                result.output.absorb(sub.output);
            }
            ctx.schema_path.pop();
        }
    }

    if cont(&result, ctx) {
        if let (Some(names_schema), Some(inst_obj)) = (obj.get("propertyNames"), inst_obj) {
            ctx.schema_path.push("propertyNames");
            for key in inst_obj.distinct_keys() {
                let key_value = Value::from(key);
                let sub = validate_node(ctx, names_schema, &key_value);
                result.output.absorb(sub.output);
            }
            ctx.schema_path.pop();
        }
    }

    let prefix_len = if cont(&result, ctx) {
        if let (Some(Value::Array(schemas)), Some(items)) = (obj.get("prefixItems"), inst_items) {
            ctx.schema_path.push("prefixItems");
            for (i, sub_schema) in schemas.iter().enumerate() {
                if i >= items.len() {
                    break;
                }
                ctx.schema_path.push(i.to_string());
                ctx.instance_path.push(i.to_string());
                let sub = validate_node(ctx, sub_schema, &items[i]);
                ctx.instance_path.pop();
                ctx.schema_path.pop();
                if sub.valid {
                    result.evaluated_items.insert(i);
                }
                result.output.absorb(sub.output);
            }
            ctx.schema_path.pop();
            schemas.len()
        } else {
            0
        }
    } else {
        0
    };

    if cont(&result, ctx) {
        if let (Some(items_schema), Some(items)) = (obj.get("items"), inst_items) {
            ctx.schema_path.push("items");
            for i in prefix_len..items.len() {
                ctx.instance_path.push(i.to_string());
                let sub = validate_node(ctx, items_schema, &items[i]);
                ctx.instance_path.pop();
                if sub.valid {
                    result.evaluated_items.insert(i);
                }
                result.output.absorb(sub.output);
            }
            ctx.schema_path.pop();
        }
    }

    if cont(&result, ctx) {
        if let (Some(contains_schema), Some(items)) = (obj.get("contains"), inst_items) {
            ctx.schema_path.push("contains");
            let mut matched = 0usize;
            for (i, value) in items.iter().enumerate() {
                ctx.instance_path.push(i.to_string());
                let sub = validate_node(ctx, contains_schema, value);
                ctx.instance_path.pop();
                if sub.valid {
                    matched += 1;
                    result.evaluated_items.insert(i);
                }
            }
            ctx.schema_path.pop();
            let min_contains = obj.get("minContains").and_then(|v| v.num().ok()).map(|n| n.as_f64() as usize).unwrap_or(1);
            let max_contains = obj.get("maxContains").and_then(|v| v.num().ok()).map(|n| n.as_f64() as usize);
            let within_max = max_contains.map_or(true, |max| matched <= max);
            if matched < min_contains || !within_max {
                record(
                    &mut result,
                    ctx,
                    "contains",
                    Err(format!("expected at least {min_contains} matching items, found {matched}")),
                );
            }
        }
    }

    if cont(&result, ctx) {
        if let (Some(Value::Object(dependent)), Some(inst_obj)) = (obj.get("dependentSchemas"), inst_obj) {
            ctx.schema_path.push("dependentSchemas");
            for (key, sub_schema) in dependent.iter() {
                if inst_obj.has(key) {
                    ctx.schema_path.push(key);
                    let sub = validate_node(ctx, sub_schema, instance);
                    ctx.schema_path.pop();
                    if sub.valid {
                        result.merge_evaluated(&sub);
                    }
                    result.output.absorb(sub.output);
                }
            }
            ctx.schema_path.pop();
        }
    }

    // --- validation: type / enum / const / bounds ---
    if cont(&result, ctx) {
        if let Some(type_val) = obj.get("type") {
            record(&mut result, ctx, "type", v::check_type(type_val, instance));
        }
    }
    if cont(&result, ctx) {
        if let Some(enum_val) = obj.get("enum") {
            record(&mut result, ctx, "enum", v::check_enum(enum_val, instance));
        }
    }
    if cont(&result, ctx) {
        if let Some(const_val) = obj.get("const") {
            record(&mut result, ctx, "const", v::check_const(const_val, instance));
        }
    }

    if let Value::Number(n) = instance {
        if cont(&result, ctx) {
            if let Some(bound) = obj.get("minimum").and_then(|v| v.num().ok()) {
                record(&mut result, ctx, "minimum", v::check_minimum(n, bound));
            }
        }
        if cont(&result, ctx) {
            if let Some(bound) = obj.get("maximum").and_then(|v| v.num().ok()) {
                record(&mut result, ctx, "maximum", v::check_maximum(n, bound));
            }
        }
        if cont(&result, ctx) {
            if let Some(bound) = obj.get("exclusiveMinimum").and_then(|v| v.num().ok()) {
                record(&mut result, ctx, "exclusiveMinimum", v::check_exclusive_minimum(n, bound));
            }
        }
        if cont(&result, ctx) {
            if let Some(bound) = obj.get("exclusiveMaximum").and_then(|v| v.num().ok()) {
                record(&mut result, ctx, "exclusiveMaximum", v::check_exclusive_maximum(n, bound));
            }
        }
        if cont(&result, ctx) {
            if let Some(of) = obj.get("multipleOf").and_then(|v| v.num().ok()) {
                let verdict = v::check_multiple_of(ctx.numeric_backend(), n, of);
                record(&mut result, ctx, "multipleOf", verdict);
            }
        }
    }

    if let Value::String(s) = instance {
        if cont(&result, ctx) {
            if let Some(bound) = obj.get("minLength").and_then(|v| v.num().ok()) {
                record(&mut result, ctx, "minLength", v::check_min_length(s, bound));
            }
        }
        if cont(&result, ctx) {
            if let Some(bound) = obj.get("maxLength").and_then(|v| v.num().ok()) {
                record(&mut result, ctx, "maxLength", v::check_max_length(s, bound));
            }
        }
        if cont(&result, ctx) {
            if let Some(pattern) = obj.get("pattern").and_then(|v| v.str().ok()) {
                record(&mut result, ctx, "pattern", v::check_pattern(s, pattern));
            }
        }
    }

    if let Some(items) = inst_items {
        if cont(&result, ctx) {
            if let Some(bound) = obj.get("minItems").and_then(|v| v.num().ok()) {
                record(&mut result, ctx, "minItems", v::check_min_items(items.len(), bound));
            }
        }
        if cont(&result, ctx) {
            if let Some(bound) = obj.get("maxItems").and_then(|v| v.num().ok()) {
                record(&mut result, ctx, "maxItems", v::check_max_items(items.len(), bound));
            }
        }
        if cont(&result, ctx) {
            if matches!(obj.get("uniqueItems"), Some(Value::Boolean(true))) {
                record(&mut result, ctx, "uniqueItems", v::check_unique_items(items));
            }
        }
    }

    if let Some(inst_obj) = inst_obj {
        if cont(&result, ctx) {
            if let Some(bound) = obj.get("minProperties").and_then(|v| v.num().ok()) {
                record(&mut result, ctx, "minProperties", v::check_min_properties(inst_obj, bound));
            }
        }
        if cont(&result, ctx) {
            if let Some(bound) = obj.get("maxProperties").and_then(|v| v.num().ok()) {
                record(&mut result, ctx, "maxProperties", v::check_max_properties(inst_obj, bound));
            }
        }
        if cont(&result, ctx) {
            if let Some(Value::Array(items)) = obj.get("required") {
                let names: Vec<&str> = items.iter().filter_map(|v| v.str().ok()).collect();
                record(&mut result, ctx, "required", v::check_required(inst_obj, &names));
            }
        }
        if cont(&result, ctx) {
            if let Some(Value::Object(dependent)) = obj.get("dependentRequired") {
                record(&mut result, ctx, "dependentRequired", v::check_dependent_required(inst_obj, dependent));
            }
        }
    }

    // --- unevaluated: must run last, after every other applicator ---
    if cont(&result, ctx) {
        if let (Some(items_schema), Some(items)) = (obj.get("unevaluatedItems"), inst_items) {
            let unmatched = applicator::unmatched_indices(items.len(), &result.evaluated_items);
            ctx.schema_path.push("unevaluatedItems");
            for i in unmatched {
                ctx.instance_path.push(i.to_string());
                let sub = validate_node(ctx, items_schema, &items[i]);
                ctx.instance_path.pop();
                if sub.valid {
                    result.evaluated_items.insert(i);
                }
                result.output.absorb(sub.output);
            }
            ctx.schema_path.pop();
        }
    }

    if cont(&result, ctx) {
        if let (Some(props_schema), Some(inst_obj)) = (obj.get("unevaluatedProperties"), inst_obj) {
            let unmatched: Vec<String> =
                applicator::unmatched_properties(inst_obj, &result.evaluated_props).into_iter().map(String::from).collect();
            ctx.schema_path.push("unevaluatedProperties");
            for key in unmatched {
                let value = inst_obj.get(&key).unwrap();
                ctx.instance_path.push(key.clone());
                let sub = validate_node(ctx, props_schema, value);
                ctx.instance_path.pop();
                if sub.valid {
                    result.evaluated_props.insert(key);
                }
                result.output.absorb(sub.output);
            }
            ctx.schema_path.pop();
        }
    }

    result.valid = result.output.valid;

    ctx.leave_visit();
    ctx.current_base = previous_base;
    if base_pushed {
        ctx.dynamic_scope.pop();
    }

    result
}

fn apply_reference(
    result: &mut NodeResult,
    ctx: &mut Context,
    keyword: &str,
    ref_str: &str,
    instance: &Value,
    dynamic: bool,
) {
    let resolved = if dynamic {
        ctx.registry.resolve_dynamic(&ctx.current_base, ref_str, &ctx.dynamic_scope)
    } else {
        ctx.registry.resolve(&ctx.current_base, ref_str)
    };
    match resolved {
        Ok((doc, ptr, new_base)) => match ptr.resolve(&doc) {
            Ok(target) => {
                ctx.schema_path.push(keyword);
                let prev_base = std::mem::replace(&mut ctx.current_base, new_base);
                let sub = validate_node(ctx, target, instance);
                ctx.current_base = prev_base;
                ctx.schema_path.pop();
                if sub.valid {
                    result.merge_evaluated(&sub);
                }
                result.output.absorb(sub.output);
            }
            Err(e) => record(result, ctx, keyword, Err(e.to_string())),
        },
        Err(schema_err) => {
            let fallback = ctx.options.on_unresolved_ref.as_ref().and_then(|cb| cb(ref_str));
            match fallback {
                Some(doc) => {
                    ctx.schema_path.push(keyword);
                    let sub = validate_node(ctx, &doc, instance);
                    ctx.schema_path.pop();
                    if sub.valid {
                        result.merge_evaluated(&sub);
                    }
                    result.output.absorb(sub.output);
                }
                None => record(result, ctx, keyword, Err(schema_err.to_string())),
            }
        }
    }
}

#[allow(dead_code)]
pub(crate) fn default_options() -> ValidationOptions {
    ValidationOptions::default()
}
