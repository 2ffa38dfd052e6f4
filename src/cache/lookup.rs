//! Lookup Module
//!
//! Loose field equality and first-match search over a cached collection.
//!
//! Scalars compare the way a JavaScript `==` does: a number matches a string
//! that parses to the same number, booleans compare as `1`/`0`, and a missing
//! field matches `null`.
//!
//! Arrays and objects never match anything. JavaScript would convert them to
//! primitives first (`[5] == 5` holds there); lookups here only target scalars.

use serde_json::Value;

use crate::cache::Item;
use crate::models::Lookup;

// == Find First ==
/// Returns the first item whose `lookup.key` field loosely equals `lookup.value`.
///
/// Items that are not JSON objects are skipped.
pub fn find_first<'a>(items: &'a [Item], lookup: &Lookup) -> Option<&'a Item> {
    items.iter().find(|item| {
        item.as_object()
            .is_some_and(|fields| loose_eq(fields.get(&lookup.key), &lookup.value))
    })
}

// == Loose Equality ==
/// Compares an item field (`None` when absent) against a lookup value.
pub fn loose_eq(field: Option<&Value>, target: &Value) -> bool {
    match field {
        None => target.is_null(),
        Some(value) => values_loose_eq(value, target),
    }
}

fn values_loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => x == y || number_eq(x.as_f64(), y.as_f64()),
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
            number_eq(n.as_f64(), Some(string_to_number(s)))
        }
        (Value::Bool(flag), other) | (other, Value::Bool(flag)) => {
            values_loose_eq(&Value::from(u8::from(*flag)), other)
        }
        _ => false,
    }
}

fn number_eq(a: Option<f64>, b: Option<f64>) -> bool {
    match (a, b) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

/// Converts a string to a number following JavaScript's `Number(string)`.
///
/// Blank strings become `0`; anything unparseable becomes `NaN`.
pub fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = trimmed.strip_prefix(prefix) {
            if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
                return f64::NAN;
            }
            return u64::from_str_radix(digits, radix)
                .map(|n| n as f64)
                .unwrap_or(f64::NAN);
        }
    }

    // f64::from_str also accepts "inf" and "nan", which are not numbers here
    let decimal = trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
    if !decimal {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}
