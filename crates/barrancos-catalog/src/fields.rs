//! Ordered alias lookup over untyped raw records.
//!
//! Each canonical field can be spelled several ways across sources. Alias
//! lists are evaluated left to right; the first usable value wins.

use barrancos_core::RawRecord;
use serde_json::Value;

use crate::normalize::normalize_value;

/// Returns the first alias whose value is present and not `null`.
#[must_use]
pub fn first_value<'a>(record: &'a RawRecord, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .filter_map(|alias| record.get(*alias))
        .find(|value| !value.is_null())
}

/// Returns the first alias holding a non-blank string, normalized.
#[must_use]
pub fn first_normalized(record: &RawRecord, aliases: &[&str]) -> Option<String> {
    aliases
        .iter()
        .find_map(|alias| normalize_value(record.get(*alias)))
}

/// Looks up `key` inside a nested object field, e.g. `wikiloc.approach`.
#[must_use]
pub fn nested<'a>(record: &'a RawRecord, object: &str, key: &str) -> Option<&'a Value> {
    record.get(object)?.as_object()?.get(key)
}

/// Parses a JSON number or numeric string into a finite `f64`.
///
/// Anything else (booleans, blank strings, `NaN`, objects) yields `None`.
#[must_use]
pub fn parse_finite(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}

/// Rounds to two decimal places.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
