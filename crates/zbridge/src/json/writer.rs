//! JSON serializers for [`Value`]

use indexmap::map::Iter;

use crate::value::{Value, format_number};

/// Indent width used by [`to_string_pretty`]
pub const DEFAULT_INDENT: usize = 4;

/// Serialize to compact JSON (no insignificant whitespace)
pub fn to_string(value: &Value) -> String {
    let mut out = String::new();
    write_compact(value, &mut out);
    out
}

/// Serialize to JSON indented by [`DEFAULT_INDENT`] spaces per level
pub fn to_string_pretty(value: &Value) -> String {
    to_string_with_indent(value, DEFAULT_INDENT)
}

/// Serialize to JSON indented by `indent` spaces per level.
///
/// Members are written as `"key": value`, one per line. Empty containers
/// stay on one line as `{}` and `[]`.
pub fn to_string_with_indent(value: &Value, indent: usize) -> String {
    let mut out = String::new();
    write_pretty(value, indent, &mut out);
    out
}

fn write_compact(value: &Value, out: &mut String) {
    write_value(value, None, out);
}

fn write_pretty(value: &Value, indent: usize, out: &mut String) {
    write_value(value, Some(indent), out);
}

/// Open container being written, with whether a member was written yet
enum Frame<'v> {
    Array(std::slice::Iter<'v, Value>, bool),
    Object(Iter<'v, String, Value>, bool),
}

/// Containers are tracked on an explicit stack so output depth is not
/// limited by the call stack
fn write_value(value: &Value, indent: Option<usize>, out: &mut String) {
    let mut stack = Vec::new();
    if let Some(frame) = open(value, out) {
        stack.push(frame);
    }

    while let Some(frame) = stack.last_mut() {
        let (next, started) = match frame {
            Frame::Array(items, started) => (items.next().map(|item| (None, item)), started),
            Frame::Object(members, started) => (
                members.next().map(|(key, item)| (Some(key), item)),
                started,
            ),
        };

        let Some((key, item)) = next else {
            let close = match frame {
                Frame::Array(..) => ']',
                Frame::Object(..) => '}',
            };
            stack.pop();
            if let Some(indent) = indent {
                newline(indent, stack.len(), out);
            }
            out.push(close);
            continue;
        };

        if *started {
            out.push(',');
        }
        *started = true;
        if let Some(indent) = indent {
            newline(indent, stack.len(), out);
        }
        if let Some(key) = key {
            write_string(key, out);
            out.push_str(if indent.is_some() { ": " } else { ":" });
        }
        if let Some(frame) = open(item, out) {
            stack.push(frame);
        }
    }
}

/// Write a scalar or an empty container whole, or the opening bracket of
/// a non-empty container
fn open<'v>(value: &'v Value, out: &mut String) -> Option<Frame<'v>> {
    match value {
        Value::Array(arr) if !arr.is_empty() => {
            out.push('[');
            return Some(Frame::Array(arr.iter(), false));
        }
        Value::Object(obj) if !obj.is_empty() => {
            out.push('{');
            return Some(Frame::Object(obj.iter(), false));
        }
        Value::Array(_) => out.push_str("[]"),
        Value::Object(_) => out.push_str("{}"),
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) if n.is_finite() => out.push_str(&format_number(*n)),
        Value::Number(_) => out.push_str("null"),
        Value::String(s) => write_string(s, out),
    }
    None
}

fn newline(indent: usize, level: usize, out: &mut String) {
    out.push('\n');
    out.extend(std::iter::repeat_n(' ', indent.saturating_mul(level)));
}

fn write_string(input: &str, out: &mut String) {
    out.push('"');
    for ch in input.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0C}' => out.push_str("\\f"),
            c if u32::from(c) < 0x20 => out.push_str(&format!("\\u{:04x}", u32::from(c))),
            c => out.push(c),
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Array, Object};

    fn sample() -> Value {
        let mut inner = Object::new();
        inner.insert("id", 7i32);
        inner.insert("tags", Value::Array(Array::from(vec!["a".into(), "b".into()])));
        let mut root = Object::new();
        root.insert("order", Value::Object(inner));
        root.insert("empty", Value::Object(Object::new()));
        root.insert("none", Value::Array(Array::new()));
        root.insert("flag", false);
        Value::Object(root)
    }

    #[test]
    fn test_compact() {
        assert_eq!(
            to_string(&sample()),
            r#"{"order":{"id":7,"tags":["a","b"]},"empty":{},"none":[],"flag":false}"#
        );
    }

    #[test]
    fn test_pretty_four_spaces() {
        let expected = "{\n    \"order\": {\n        \"id\": 7,\n        \"tags\": [\n            \"a\",\n            \"b\"\n        ]\n    },\n    \"empty\": {},\n    \"none\": [],\n    \"flag\": false\n}";
        assert_eq!(to_string_pretty(&sample()), expected);
    }

    #[test]
    fn test_custom_indent() {
        let mut obj = Object::new();
        obj.insert("a", Value::Null);
        assert_eq!(
            to_string_with_indent(&Value::Object(obj), 2),
            "{\n  \"a\": null\n}"
        );
    }

    #[test]
    fn test_string_escaping() {
        let value = Value::String("q\"b\\n\nt\t\u{1}\u{8}é".to_string());
        assert_eq!(to_string(&value), r#""q\"b\\n\nt\t\u0001\bé""#);
    }

    #[test]
    fn test_numbers() {
        assert_eq!(to_string(&Value::Number(1.0)), "1");
        assert_eq!(to_string(&Value::Number(-2.5)), "-2.5");
        assert_eq!(to_string(&Value::Number(f64::NAN)), "null");
        assert_eq!(to_string(&Value::Number(f64::INFINITY)), "null");
    }

    #[test]
    fn test_deep_nesting() {
        let mut value = Value::Null;
        for _ in 0..20_000 {
            let mut obj = Object::new();
            obj.insert("a", Value::from(vec![value]));
            value = Value::Object(obj);
        }
        let out = to_string(&value);
        assert!(out.starts_with(r#"{"a":[{"a":["#));
        assert!(out.ends_with("null]}]}"));
        assert_eq!(to_string_with_indent(&value, 0).matches('\n').count(), 80_000);
    }

    #[test]
    fn test_scalar_root_pretty() {
        assert_eq!(to_string_pretty(&Value::String("x".to_string())), r#""x""#);
        assert_eq!(to_string_pretty(&Value::Null), "null");
    }
}
