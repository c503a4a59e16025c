//! Loose field coercion for request bodies.
//!
//! Callers send hand-built JSON, so numeric fields may arrive as numbers or
//! numeric strings. Coercion never fails: anything unusable becomes `NaN`,
//! which the operations then treat as invalid (score/batch) or as a
//! comparison that is never true (route).

use serde_json::Value;

use crate::domain::Domain;

/// Coerce a JSON value to `f64`, following JavaScript's `Number(value)`.
///
/// - numbers as-is, including ones past `f64` range (`1e400` is `inf`)
/// - strings via [`parse_numeric`]
/// - booleans `1` / `0`
/// - `[]` is `0` and `[x]` coerces through `x`'s string form
/// - missing, `null`, objects, longer arrays: `NaN`
pub fn number(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or_else(|| parse_numeric(&n.to_string())),
        Some(Value::String(s)) => parse_numeric(s),
        Some(Value::Bool(b)) => f64::from(u8::from(*b)),
        Some(Value::Array(items)) => match items.as_slice() {
            [] => 0.0,
            [only] => array_element(only),
            _ => f64::NAN,
        },
        Some(Value::Null | Value::Object(_)) | None => f64::NAN,
    }
}

/// A lone array element is stringified before conversion, so `null` reads
/// as `""` and booleans as the words `true`/`false`.
fn array_element(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Bool(_) | Value::Object(_) => f64::NAN,
        other => number(Some(other)),
    }
}

/// String-to-number conversion with JavaScript's grammar.
///
/// Surrounding whitespace is ignored and the empty string is `0`. Accepted
/// forms are decimal literals (`12`, `-.5`, `1e3`), the exact words
/// `Infinity`/`+Infinity`/`-Infinity`, and unsigned `0x`/`0o`/`0b` integers.
/// Everything else, including `inf` and `nan`, is `NaN`.
pub fn parse_numeric(raw: &str) -> f64 {
    let s = raw.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}');
    match s {
        "" => return 0.0,
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    let radix = match s.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return parse_radix(&s[2..], radix);
    }

    let decimal_chars = s.bytes().all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
    if !decimal_chars {
        return f64::NAN;
    }
    s.parse().unwrap_or(f64::NAN)
}

fn parse_radix(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }
    digits
        .chars()
        .try_fold(0.0_f64, |acc, c| c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d)))
        .unwrap_or(f64::NAN)
}

/// Like [`number`], but `default` when the field is missing or `null`.
pub fn number_or(value: Option<&Value>, default: f64) -> f64 {
    match value {
        None | Some(Value::Null) => default,
        other => number(other),
    }
}

/// JSON truthiness: `false`, `0`, `NaN`, `""`, `null`, and missing are false.
pub fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(n @ Value::Number(_)) => {
            let v = number(Some(n));
            v != 0.0 && !v.is_nan()
        }
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}

/// A domain given as a JSON string naming one of the six codes.
pub fn domain(value: Option<&Value>) -> Option<Domain> {
    value.and_then(Value::as_str).and_then(|s| s.parse().ok())
}
