//! A process-wide cache of compiled `pattern`/`patternProperties` regexes.
//!
//! Schema documents are validated repeatedly against many instances, and
//! the same pattern strings recur across `pattern`, `patternProperties`,
//! and repeated `contains`/`items` calls within one validation run. Without
//! this cache every keyword check would recompile its regex from scratch
//! on every instance, which dominates validation cost for pattern-heavy
//! schemas.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;
use regex::Regex;

static CACHE: Lazy<Mutex<HashMap<String, Arc<Regex>>>> = Lazy::new(|| Mutex::new(HashMap::new()));

/// Returns a compiled regex for `pattern`, reusing a prior compilation if
/// one exists. Propagates `regex::Error` for malformed patterns without
/// caching the failure, since a transient typo fixed between calls
/// shouldn't require a process restart to take effect.
pub fn compiled(pattern: &str) -> Result<Arc<Regex>, regex::Error> {
    if let Some(re) = CACHE.lock().unwrap().get(pattern) {
        return Ok(Arc::clone(re));
    }
    let re = Arc::new(Regex::new(pattern)?);
    CACHE.lock().unwrap().insert(pattern.to_string(), Arc::clone(&re));
    Ok(re)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_lookups_return_the_same_pattern_text() {
        let a = compiled(r"^[a-z]+$").unwrap();
        let b = compiled(r"^[a-z]+$").unwrap();
        assert_eq!(a.as_str(), b.as_str());
    }

    #[test]
    fn invalid_pattern_reports_an_error() {
        assert!(compiled("(unclosed").is_err());
    }
}
