//! Status and content assertions.
//!
//! Everything here is pure: no I/O and no logging. Content matching and
//! first-divergence reporting share one recursive walk, so a reported path is
//! always the reason the match failed.

use std::fmt;

use serde_json::{Number, Value};

/// Expected string matching any non-blank string or any non-null value.
pub const WILDCARD: &str = "...";

const MISSING: &str = "<missing>";
const ERROR_HINT_KEYS: [&str; 7] = ["detail", "error", "errors", "message", "msg", "reason", "title"];

/// How expected numbers compare against actual values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumericMode {
    /// Numeric values must be equal (`5` equals `5.0`).
    #[default]
    Exact,
    /// Any number satisfies an expected number.
    Relaxed,
}

impl NumericMode {
    pub fn from_relaxed(relaxed: bool) -> Self {
        if relaxed { NumericMode::Relaxed } else { NumericMode::Exact }
    }
}

/// The first place, in traversal order, where actual content differs from
/// the expectation. Values are rendered as compact JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Divergence {
    pub path: String,
    pub expected: String,
    pub actual: String,
}

impl Divergence {
    fn at(path: &str, expected: &Value, actual: &Value) -> Self {
        Self {
            path: path.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

impl fmt::Display for Divergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (expected={} got={})", self.path, self.expected, self.actual)
    }
}

/// An empty expected set accepts any 2xx.
pub fn status_matches(actual: u16, expected: &[u16]) -> bool {
    if expected.is_empty() {
        (200..=299).contains(&actual)
    } else {
        expected.contains(&actual)
    }
}

pub fn status_mismatch_reason(expected: &[u16], actual: u16, body: &str) -> String {
    let base = if expected.is_empty() {
        format!("Expected a 2xx status but received {actual}.")
    } else {
        format!("Expected status in {expected:?} but received {actual}.")
    };

    match error_hint(body) {
        Some(hint) if !hint.is_empty() => format!("{base} Response hint: {hint}"),
        _ => base,
    }
}

pub fn content_mismatch_reason(divergence: &Divergence) -> String {
    format!("Response content mismatch at {divergence}.")
}

/// Best-effort error message from a JSON error body.
///
/// Each object is checked for the well-known keys in priority order before
/// descending into its values; arrays are searched element by element.
pub fn error_hint(body: &str) -> Option<String> {
    if body.trim().is_empty() {
        return None;
    }
    let value: Value = serde_json::from_str(body).ok()?;
    find_hint(&value)
}

fn find_hint(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => {
            if let Some(found) = ERROR_HINT_KEYS.iter().find_map(|key| map.get(*key)) {
                return Some(found.to_string());
            }
            map.values().find_map(find_hint)
        }
        Value::Array(items) => items.iter().find_map(find_hint),
        _ => None,
    }
}

pub fn content_matches(expected: &Value, actual: &Value, mode: NumericMode) -> bool {
    first_divergence(expected, actual, mode).is_none()
}

/// Structural match of `expected` against `actual`.
///
/// Objects: every expected key must be present and match; extra actual keys
/// are ignored. Arrays: actual must be at least as long and the expected
/// prefix must match positionally. Scalars compare per [`scalar_matches`].
pub fn first_divergence(expected: &Value, actual: &Value, mode: NumericMode) -> Option<Divergence> {
    diverge("$", expected, actual, mode)
}

fn diverge(path: &str, expected: &Value, actual: &Value, mode: NumericMode) -> Option<Divergence> {
    match expected {
        Value::Object(expected_map) => {
            let Value::Object(actual_map) = actual else {
                return Some(Divergence::at(path, expected, actual));
            };
            expected_map.iter().find_map(|(key, expected_value)| {
                let child = format!("{path}.{key}");
                match actual_map.get(key) {
                    Some(actual_value) => diverge(&child, expected_value, actual_value, mode),
                    None => Some(Divergence {
                        path: child,
                        expected: expected_value.to_string(),
                        actual: MISSING.to_string(),
                    }),
                }
            })
        }
        Value::Array(expected_items) => {
            let Value::Array(actual_items) = actual else {
                return Some(Divergence::at(path, expected, actual));
            };
            if actual_items.len() < expected_items.len() {
                return Some(Divergence {
                    path: path.to_string(),
                    expected: format!("len>={}", expected_items.len()),
                    actual: format!("len={}", actual_items.len()),
                });
            }
            expected_items
                .iter()
                .zip(actual_items)
                .enumerate()
                .find_map(|(index, (e, a))| diverge(&format!("{path}[{index}]"), e, a, mode))
        }
        _ if scalar_matches(expected, actual, mode) => None,
        _ => Some(Divergence::at(path, expected, actual)),
    }
}

fn scalar_matches(expected: &Value, actual: &Value, mode: NumericMode) -> bool {
    match expected {
        Value::String(wildcard) if wildcard == WILDCARD => match actual {
            Value::String(text) => !text.trim().is_empty(),
            Value::Null => false,
            _ => true,
        },
        Value::String(text) => actual.as_str() == Some(text.as_str()),
        Value::Number(expected_number) => match (mode, actual) {
            (NumericMode::Relaxed, Value::Number(_)) => true,
            (NumericMode::Exact, Value::Number(actual_number)) => numbers_equal(expected_number, actual_number),
            _ => false,
        },
        _ => expected == actual,
    }
}

fn numbers_equal(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    a.as_f64() == b.as_f64()
}
