//! Identifier conventions used by spec generators that have no explicit
//! behavior field. Only ingestion calls into this module; the runner works
//! from [`Behavior`] values.

use super::Behavior;

const AUTH_SUPPRESSING_MARKERS: [&str; 4] = [
    "missing-auth",
    "missing_auth",
    "missing-required-header-authorization",
    "wrong-header-value-authorization",
];
const CONTENT_TYPE_SUPPRESSING_MARKER: &str = "missing-required-header-content-type";
const RATE_LIMIT_PREFIX: &str = "rate-limit-exceeded-";
const RELAXED_NUMBERS_MARKER: &str = "success-valid-request";

/// Derive a behavior descriptor from a test identifier.
pub fn infer_behavior(test_id: &str) -> Behavior {
    let id = test_id.trim().to_lowercase();

    Behavior {
        inject_auth: !AUTH_SUPPRESSING_MARKERS.iter().any(|marker| id.contains(marker)),
        inject_content_type: !id.contains(CONTENT_TYPE_SUPPRESSING_MARKER),
        rate_limit: parse_rate_limit(&id),
        relaxed_numbers: id.contains(RELAXED_NUMBERS_MARKER),
    }
}

/// `rate-limit-exceeded-<n>`; counts clamp to `1..=u32::MAX`.
fn parse_rate_limit(id: &str) -> Option<u32> {
    let count: i64 = id.strip_prefix(RATE_LIMIT_PREFIX)?.parse().ok()?;
    Some(u32::try_from(count.max(1)).unwrap_or(u32::MAX))
}
