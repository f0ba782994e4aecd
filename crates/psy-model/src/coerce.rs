//! Field coercion
//!
//! Total conversions from arbitrary JSON input into typed field values.
//! None of these functions fail: malformed input falls back to a
//! deterministic default instead of producing an error.

use chrono::NaiveDate;
use serde_json::Value;

/// ISO calendar date format used by session dates
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Convert to a finite number
///
/// Strings are parsed with `.` as the only decimal separator. Grouping
/// separators and textual infinities are rejected.
#[must_use]
pub fn to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => parse_decimal(s),
        _ => None,
    }
}

/// Convert to an integer, or `default` when not representable
#[must_use]
pub fn to_int(value: &Value, default: i64) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                    .map(|f| f.trunc() as i64)
            })
            .unwrap_or(default),
        Value::String(s) => s.trim().parse::<i64>().unwrap_or(default),
        _ => default,
    }
}

/// Convert using truthiness; absent and `null` are `false`
#[must_use]
pub fn to_bool(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Convert to a date, falling back to `fallback` on any parse failure
///
/// The fallback is normally "today"; a malformed date is silently replaced
/// so the ledger always stays displayable.
#[must_use]
pub fn to_date(value: &Value, fallback: NaiveDate) -> NaiveDate {
    parse_iso_date(value).unwrap_or(fallback)
}

/// Strict `YYYY-MM-DD` parse with no fallback
#[must_use]
pub fn parse_iso_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::String(s) => NaiveDate::parse_from_str(s.trim(), ISO_DATE_FORMAT).ok(),
        _ => None,
    }
}

/// Convert to a trimmed string
#[must_use]
pub fn to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

fn parse_decimal(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    // digits, sign, one decimal point and an exponent only
    let plain = s
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'));
    if !plain {
        return None;
    }
    s.parse::<f64>().ok().filter(|f| f.is_finite())
}
