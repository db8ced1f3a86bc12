//! Typing of XML text content

use crate::value::{Value, format_number};

/// Infer a JSON value from element text.
///
/// Empty text is `null`, `true`/`false` in any ASCII case are booleans, and
/// plain decimal literals are numbers when an `f64` holds them exactly
/// (trailing fractional zeros aside). Everything else stays a string,
/// untrimmed.
pub fn coerce_text(text: &str) -> Value {
    if text.is_empty() {
        return Value::Null;
    }
    if text.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if text.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    match parse_number(text) {
        Some(n) => Value::Number(n),
        None => Value::String(text.to_string()),
    }
}

fn parse_number(text: &str) -> Option<f64> {
    if !is_decimal_literal(text) {
        return None;
    }
    let n: f64 = text.parse().ok()?;
    (n.is_finite() && format_number(n) == canonical(text)).then_some(n)
}

/// `-?(0|[1-9][0-9]*)(\.[0-9]+)?`
fn is_decimal_literal(text: &str) -> bool {
    let unsigned = text.strip_prefix('-').unwrap_or(text);
    let (int, frac) = match unsigned.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (unsigned, None),
    };

    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    let int_ok = int == "0" || (all_digits(int) && !int.starts_with('0'));
    int_ok && frac.is_none_or(all_digits)
}

fn canonical(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}
