//! The `applicator` vocabulary's non-recursive helpers: pattern matching
//! for `patternProperties`, and the "which properties/items does this
//! keyword's sibling set leave uncovered" bookkeeping that
//! [`crate::schema::evaluator`] needs when it dispatches `properties`,
//! `patternProperties`, `additionalProperties`, `items`, and `prefixItems`.
//! The actual recursive subschema application lives in the evaluator,
//! since only it holds the [`crate::schema::context::Context`] needed to
//! recurse.

use std::collections::HashSet;

use crate::value::Object;

/// Property names matched by at least one pattern in `pattern_properties`.
pub fn properties_matched_by_patterns<'a>(obj: &'a Object, pattern_properties: &'a Object) -> Vec<(&'a str, Vec<&'a str>)> {
    let mut patterns = Vec::new();
    for (pattern, _) in pattern_properties.iter() {
        if let Ok(re) = super::regex_cache::compiled(pattern) {
            patterns.push((pattern, re));
        }
    }
    obj.distinct_keys()
        .into_iter()
        .map(|key| {
            let matches: Vec<&str> = patterns
                .iter()
                .filter(|(_, re)| re.is_match(key))
                .map(|(p, _)| *p)
                .collect();
            (key, matches)
        })
        .collect()
}

/// Properties of `obj` not already covered by `evaluated` (used by
/// `additionalProperties`).
pub fn unmatched_properties<'a>(obj: &'a Object, evaluated: &HashSet<String>) -> Vec<&'a str> {
    obj.distinct_keys().into_iter().filter(|k| !evaluated.contains(*k)).collect()
}

/// Item indices of an array not already covered by `evaluated` (used by
/// `items` beyond `prefixItems`, and by `unevaluatedItems`).
pub fn unmatched_indices(len: usize, evaluated: &HashSet<usize>) -> Vec<usize> {
    (0..len).filter(|i| !evaluated.contains(i)).collect()
}
