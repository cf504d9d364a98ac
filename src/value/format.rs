//! Text serialization for [`Value::describe`](super::Value::describe).

use super::Value;

/// Output format for [`Value::describe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// No insignificant whitespace.
    Compact,
    /// 4-space indent, newline after `{` `[` `,`, space after `:`.
    Pretty,
    /// Like `Pretty`, but emits unquoted identifier keys where legal and
    /// accepts them back on re-parse with `allow_relaxed_format`.
    Relaxed,
}

const IDENTIFIER_START: fn(char) -> bool = |c| c == '_' || c.is_ascii_alphabetic();
const IDENTIFIER_CONT: fn(char) -> bool = |c| c == '_' || c.is_ascii_alphanumeric();

pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if IDENTIFIER_START(c) => {}
        _ => return false,
    }
    chars.all(IDENTIFIER_CONT)
}

pub fn describe(value: &Value, format: Format) -> String {
    let mut out = String::new();
    match format {
        Format::Compact => write_value(value, &mut out, None, 0),
        Format::Pretty => write_value(value, &mut out, Some(false), 0),
        Format::Relaxed => write_value(value, &mut out, Some(true), 0),
    }
    out
}

fn write_value(value: &Value, out: &mut String, pretty: Option<bool>, depth: usize) {
    match value {
        Value::Invalid => out.push_str("null"),
        Value::Null => out.push_str("null"),
        Value::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_json_text()),
        Value::String(s) => write_string(s, out),
        Value::Array(items) => write_array(items, out, pretty, depth),
        Value::Object(obj) => write_object(obj, out, pretty, depth),
    }
}

fn write_string(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("    ");
    }
}

fn write_array(items: &[Value], out: &mut String, pretty: Option<bool>, depth: usize) {
    if items.is_empty() {
        out.push_str("[]");
        return;
    }
    out.push('[');
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        if pretty.is_some() {
            out.push('\n');
            indent(out, depth + 1);
        }
        write_value(item, out, pretty, depth + 1);
    }
    if pretty.is_some() {
        out.push('\n');
        indent(out, depth);
    }
    out.push(']');
}

fn write_object(obj: &super::Object, out: &mut String, pretty: Option<bool>, depth: usize) {
    if obj.is_empty() {
        out.push_str("{}");
        return;
    }
    out.push('{');
    for (i, (key, value)) in obj.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        if pretty.is_some() {
            out.push('\n');
            indent(out, depth + 1);
        }
        let relaxed = pretty == Some(true);
        if relaxed && is_identifier(key) {
            out.push_str(key);
        } else {
            write_string(key, out);
        }
        out.push(':');
        if pretty.is_some() {
            out.push(' ');
        }
        write_value(value, out, pretty, depth + 1);
    }
    if pretty.is_some() {
        out.push('\n');
        indent(out, depth);
    }
    out.push('}');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn compact_has_no_insignificant_whitespace() {
        let v = Value::object([("a", Value::from(1))]);
        assert_eq!(describe(&v, Format::Compact), r#"{"a":1}"#);
    }

    #[test]
    fn pretty_indents_with_four_spaces() {
        let v = Value::object([("a", Value::from(1))]);
        assert_eq!(describe(&v, Format::Pretty), "{\n    \"a\": 1\n}");
    }

    #[test]
    fn relaxed_unquotes_identifier_keys() {
        let v = Value::object([("a_b", Value::from(1)), ("2bad", Value::from(2))]);
        let text = describe(&v, Format::Relaxed);
        assert!(text.contains("a_b: 1"));
        assert!(text.contains("\"2bad\": 2"));
    }

    #[test]
    fn strings_escape_control_characters() {
        let v = Value::from("a\nb\"c");
        assert_eq!(describe(&v, Format::Compact), r#""a\nb\"c""#);
    }
}
