use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::http::method::HttpMethod;

/// Why a test case failed. Exactly one per failed case: the first stage that
/// failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    RequestBuildError,
    TransportError,
    ResponseParseError,
    StatusMismatch,
    ContentMismatch,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::RequestBuildError => "request_build_error",
            FailureKind::TransportError => "transport_error",
            FailureKind::ResponseParseError => "response_parse_error",
            FailureKind::StatusMismatch => "status_mismatch",
            FailureKind::ContentMismatch => "content_mismatch",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one test case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseResult {
    pub endpoint: String,
    pub method: HttpMethod,
    pub test_id: String,
    pub passed: bool,
    #[serde(rename = "failure_type", default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
    #[serde(rename = "why_failed", default, skip_serializing_if = "String::is_empty")]
    pub why: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expected_status: Vec<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_content: Option<Value>,
    pub status: u16,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub body: String,
    pub latency_ms: u64,
}

impl CaseResult {
    /// A not-yet-decided result echoing the case's expectation.
    pub fn pending(
        endpoint: &str,
        method: HttpMethod,
        test_id: &str,
        expected_status: &[u16],
        expected_content: Option<&Value>,
    ) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            method,
            test_id: test_id.to_string(),
            passed: false,
            failure: None,
            why: String::new(),
            error: String::new(),
            expected_status: expected_status.to_vec(),
            expected_content: expected_content.cloned(),
            status: 0,
            body: String::new(),
            latency_ms: 0,
        }
    }

    pub fn fail(mut self, kind: FailureKind, why: impl Into<String>, error: impl Into<String>) -> Self {
        self.passed = false;
        self.failure = Some(kind);
        self.why = why.into();
        self.error = error.into();
        self
    }

    pub fn pass(mut self) -> Self {
        self.passed = true;
        self.failure = None;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnittestSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
}

/// Results of a whole run, in evaluation order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnittestReport {
    pub summary: UnittestSummary,
    pub persisted: bool,
    pub results: Vec<CaseResult>,
}

impl UnittestReport {
    pub(crate) fn record(&mut self, result: CaseResult) {
        self.summary.total += 1;
        if result.passed {
            self.summary.passed += 1;
        } else {
            self.summary.failed += 1;
        }
        self.results.push(result);
    }

    pub fn all_passed(&self) -> bool {
        self.summary.failed == 0
    }
}
