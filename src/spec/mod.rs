//! # Test Spec
//!
//! The declarative suite handed to the runner: endpoints, their test cases,
//! the requests to send and what to expect back. Field names follow the JSON
//! produced by the spec generator.

pub mod naming;

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::http::method::HttpMethod;

/// Ordered list of endpoints plus the base URL they live under.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestSpec {
    #[serde(default)]
    pub base_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub endpoints: Vec<Endpoint>,
}

/// A templated route. `name` is the path template, e.g. `/widgets/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    pub name: String,
    pub method: HttpMethod,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tests: Vec<Test>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Test {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub request: RequestSpec,
    #[serde(rename = "expect", default, deserialize_with = "null_as_default")]
    pub expectation: Expectation,
    /// Explicit per-test behavior. Tests without one get the defaults unless
    /// a naming-convention pass filled it in at ingestion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub behavior: Option<Behavior>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestSpec {
    #[serde(default, deserialize_with = "null_as_default")]
    pub path_params: HashMap<String, String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub query: HashMap<String, String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub body_json: Option<Value>,
}

impl RequestSpec {
    /// The body to send, if there is anything worth sending.
    pub fn body(&self) -> Option<&Value> {
        match &self.body_json {
            None | Some(Value::Null) => None,
            Some(Value::Object(map)) if map.is_empty() => None,
            Some(Value::Array(items)) if items.is_empty() => None,
            Some(value) => Some(value),
        }
    }
}

/// Acceptable statuses (empty means any 2xx) and the expected content tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Expectation {
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: Vec<u16>,
    #[serde(default)]
    pub content: Option<Value>,
}

/// How the runner treats a single test case beyond its request and
/// expectation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Behavior {
    /// Add `Authorization: Bearer <token>` when a token is configured.
    pub inject_auth: bool,
    /// Add `Content-Type: application/json` to requests carrying a body.
    pub inject_content_type: bool,
    /// Number of requests the server is expected to allow before limiting.
    /// The case sends `max(n, 1) + 1` requests and asserts on the last.
    pub rate_limit: Option<u32>,
    /// Any numeric value satisfies a numeric expectation.
    pub relaxed_numbers: bool,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            inject_auth: true,
            inject_content_type: true,
            rate_limit: None,
            relaxed_numbers: false,
        }
    }
}

impl Behavior {
    /// Total number of sequential sends for this case.
    pub fn sends(&self) -> u32 {
        match self.rate_limit {
            Some(limit) => limit.max(1).saturating_add(1),
            None => 1,
        }
    }
}

impl TestSpec {
    pub fn case_count(&self) -> usize {
        self.endpoints.iter().map(|endpoint| endpoint.tests.len()).sum()
    }

    /// Fill in the behavior of every test lacking an explicit descriptor from
    /// the conventions encoded in its identifier.
    pub fn apply_naming_conventions(&mut self) {
        for test in self.endpoints.iter_mut().flat_map(|endpoint| endpoint.tests.iter_mut()) {
            if test.behavior.is_none() {
                test.behavior = Some(naming::infer_behavior(&test.id));
            }
        }
    }
}

/// Decode a spec either at the top level of `body` or under a `response`
/// wrapper, as the generator returns it.
pub fn decode_spec(body: &[u8]) -> Result<TestSpec> {
    let direct = serde_json::from_slice::<TestSpec>(body);
    if let Ok(spec) = &direct {
        if !spec.endpoints.is_empty() || !spec.base_url.trim().is_empty() {
            return direct.map_err(Error::from);
        }
    }

    #[derive(Deserialize)]
    struct Wrapper {
        response: Option<TestSpec>,
    }
    if let Ok(Wrapper { response: Some(spec) }) = serde_json::from_slice::<Wrapper>(body) {
        return Ok(spec);
    }

    match direct {
        Err(err) => Err(Error::Json(err)),
        Ok(_) => Err(Error::Remote(
            "could not find test spec payload (expected top-level or response wrapper)".to_string(),
        )),
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
