//! RFC 6901 JSON Pointer: parsing, round-trip string rendering, and
//! resolution against a [`Value`] tree.
//!
//! Also used internally by the schema engine to build up instance/schema
//! paths token-by-token as it descends (see [`Pointer::child`]).

use crate::error::UsageError;
use crate::value::Value;

/// A parsed JSON Pointer: an ordered list of *unescaped* reference tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Pointer {
    tokens: Vec<String>,
}

impl Pointer {
    /// The empty pointer, referencing the whole document.
    pub fn root() -> Pointer {
        Pointer { tokens: Vec::new() }
    }

    pub fn from_tokens<I: IntoIterator<Item = String>>(tokens: I) -> Pointer {
        Pointer { tokens: tokens.into_iter().collect() }
    }

    /// Parses a pointer string. Must be empty (root) or start with `/`;
    /// `~1` and `~0` escapes are unescaped in that order, per RFC 6901 §4.
    pub fn parse(s: &str) -> Result<Pointer, UsageError> {
        if s.is_empty() {
            return Ok(Pointer::root());
        }
        if !s.starts_with('/') {
            return Err(UsageError::InvalidPointer(s.to_string()));
        }
        let mut tokens = Vec::new();
        for raw in s[1..].split('/') {
            if raw.contains('~') {
                let mut chars = raw.chars().peekable();
                let mut decoded = String::with_capacity(raw.len());
                while let Some(c) = chars.next() {
                    if c == '~' {
                        match chars.next() {
                            Some('1') => decoded.push('/'),
                            Some('0') => decoded.push('~'),
                            _ => return Err(UsageError::InvalidPointer(s.to_string())),
                        }
                    } else {
                        decoded.push(c);
                    }
                }
                tokens.push(decoded);
            } else {
                tokens.push(raw.to_string());
            }
        }
        Ok(Pointer { tokens })
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn is_root(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Returns a new pointer with `token` appended.
    pub fn child(&self, token: impl Into<String>) -> Pointer {
        let mut tokens = self.tokens.clone();
        tokens.push(token.into());
        Pointer { tokens }
    }

    pub fn child_index(&self, index: usize) -> Pointer {
        self.child(index.to_string())
    }

    pub fn push(&mut self, token: impl Into<String>) {
        self.tokens.push(token.into());
    }

    pub fn pop(&mut self) -> Option<String> {
        self.tokens.pop()
    }

    /// Renders the pointer back to its RFC 6901 string form, escaping `~`
    /// as `~0` and `/` as `~1`.
    pub fn to_pointer_string(&self) -> String {
        let mut out = String::new();
        for token in &self.tokens {
            out.push('/');
            for c in token.chars() {
                match c {
                    '~' => out.push_str("~0"),
                    '/' => out.push_str("~1"),
                    c => out.push(c),
                }
            }
        }
        out
    }

    /// Resolves the pointer against `root`, failing at the first segment
    /// that doesn't exist. A `-` array segment (JSON Patch's
    /// append-placeholder) always fails to resolve: it never refers to an
    /// existing element.
    pub fn resolve<'a>(&self, root: &'a Value) -> Result<&'a Value, UsageError> {
        let mut current = root;
        let mut seen = Pointer::root();
        for token in &self.tokens {
            current = step(current, token, &seen)?;
            seen.push(token.clone());
        }
        Ok(current)
    }

    pub fn resolve_mut<'a>(&self, root: &'a mut Value) -> Result<&'a mut Value, UsageError> {
        let mut current = root;
        let mut seen = Pointer::root();
        for token in &self.tokens {
            current = step_mut(current, token, &seen)?;
            seen.push(token.clone());
        }
        Ok(current)
    }
}

fn not_found(seen: &Pointer, token: &str) -> UsageError {
    UsageError::PointerNotFound(format!("{}/{}", seen.to_pointer_string(), escape_token(token)))
}

fn escape_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

fn step<'a>(current: &'a Value, token: &str, seen: &Pointer) -> Result<&'a Value, UsageError> {
    match current {
        Value::Object(obj) => obj.get(token).ok_or_else(|| not_found(seen, token)),
        Value::Array(items) => {
            if token == "-" {
                return Err(not_found(seen, token));
            }
            let index: usize = token.parse().map_err(|_| not_found(seen, token))?;
            if token != index.to_string() {
                return Err(not_found(seen, token));
            }
            items.get(index).ok_or_else(|| not_found(seen, token))
        }
        _ => Err(not_found(seen, token)),
    }
}

fn step_mut<'a>(current: &'a mut Value, token: &str, seen: &Pointer) -> Result<&'a mut Value, UsageError> {
    match current {
        Value::Object(obj) => obj.get_mut(token).ok_or_else(|| not_found(seen, token)),
        Value::Array(items) => {
            if token == "-" {
                return Err(not_found(seen, token));
            }
            let index: usize = token.parse().map_err(|_| not_found(seen, token))?;
            if token != index.to_string() {
                return Err(not_found(seen, token));
            }
            items.get_mut(index).ok_or_else(|| not_found(seen, token))
        }
        _ => Err(not_found(seen, token)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Value {
        Value::object([
            ("a", Value::array([Value::from(1i64), Value::from(2i64)])),
            ("b~c/d", Value::from("escaped key")),
        ])
    }

    #[test]
    fn round_trips_escaped_tokens() {
        let p = Pointer::parse("/b~0c~1d").unwrap();
        assert_eq!(p.tokens(), &["b~c/d".to_string()]);
        assert_eq!(p.to_pointer_string(), "/b~0c~1d");
    }

    #[test]
    fn resolves_array_index() {
        let v = doc();
        let p = Pointer::parse("/a/1").unwrap();
        assert_eq!(p.resolve(&v).unwrap(), &Value::from(2i64));
    }

    #[test]
    fn resolves_escaped_object_key() {
        let v = doc();
        let p = Pointer::parse("/b~0c~1d").unwrap();
        assert_eq!(p.resolve(&v).unwrap(), &Value::from("escaped key"));
    }

    #[test]
    fn dash_array_segment_never_resolves() {
        let v = doc();
        let p = Pointer::parse("/a/-").unwrap();
        assert!(p.resolve(&v).is_err());
    }

    #[test]
    fn missing_segment_fails_with_not_found() {
        let v = doc();
        let p = Pointer::parse("/missing/deeper").unwrap();
        let err = p.resolve(&v).unwrap_err();
        assert_eq!(err, UsageError::PointerNotFound("/missing".to_string()));
    }

    #[test]
    fn malformed_pointer_without_leading_slash_is_rejected() {
        assert!(Pointer::parse("a/b").is_err());
    }

    #[test]
    fn root_pointer_resolves_to_whole_document() {
        let v = doc();
        assert_eq!(Pointer::root().resolve(&v).unwrap(), &v);
    }
}
