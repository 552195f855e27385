//! Sequential execution of a test spec.

use serde_json::Value;

use crate::auth::AuthMethod;
use crate::environment::UnittestConfig;
use crate::http::client::Executor;
use crate::http::request::PreparedRequest;
use crate::http::url::build_url;
use crate::spec::{Endpoint, Test, TestSpec};

use super::assertion::{
    NumericMode, content_mismatch_reason, first_divergence, status_matches, status_mismatch_reason,
};
use super::events::{RunEvent, RunObserver};
use super::report::{CaseResult, FailureKind, UnittestReport};

/// Runs every test case of a spec, one at a time, in spec order.
pub struct SuiteRunner<O> {
    executor: Executor,
    auth: AuthMethod,
    observer: O,
}

impl<O: RunObserver> SuiteRunner<O> {
    pub fn new(executor: Executor, config: &UnittestConfig, observer: O) -> Self {
        Self {
            executor,
            auth: AuthMethod::from_token(config.token()),
            observer,
        }
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Execute the suite against `base_url`. Case failures are recorded in
    /// the report; they never abort the run.
    pub async fn run(&mut self, spec: &TestSpec, base_url: &str) -> UnittestReport {
        let mut report = UnittestReport::default();
        self.observer.on_event(&RunEvent::RunStarted {
            base_url,
            endpoints: spec.endpoints.len(),
            cases: spec.case_count(),
        });

        for endpoint in &spec.endpoints {
            self.observer.on_event(&RunEvent::EndpointStarted {
                endpoint: &endpoint.name,
                method: endpoint.method,
                tests: endpoint.tests.len(),
            });

            for test in &endpoint.tests {
                self.observer.on_event(&RunEvent::CaseStarted {
                    endpoint: &endpoint.name,
                    test_id: &test.id,
                });
                let result = self.run_case(base_url, endpoint, test).await;
                self.observer.on_event(&RunEvent::CaseFinished { result: &result });
                report.record(result);
            }
        }

        self.observer.on_event(&RunEvent::RunFinished {
            summary: report.summary,
        });
        report
    }

    async fn run_case(&mut self, base_url: &str, endpoint: &Endpoint, test: &Test) -> CaseResult {
        let behavior = test.behavior.unwrap_or_default();
        let expectation = &test.expectation;
        let mut result = CaseResult::pending(
            &endpoint.name,
            endpoint.method,
            &test.id,
            &expectation.status,
            expectation.content.as_ref(),
        );

        let url = match build_url(base_url, &endpoint.name, &test.request.path_params, &test.request.query) {
            Ok(url) => url,
            Err(err) => {
                return result.fail(
                    FailureKind::RequestBuildError,
                    "Failed to build request URL for this test case.",
                    format!("build url: {err}"),
                );
            }
        };

        let request = match PreparedRequest::from_test(endpoint.method, url, test, &behavior, &self.auth) {
            Ok(request) => request,
            Err(err) => {
                return result.fail(
                    FailureKind::TransportError,
                    "Request could not be constructed.",
                    err.to_string(),
                );
            }
        };

        // Rate-limit probes replay the request and keep only the last response.
        for attempt in 1..=behavior.sends() {
            match self.executor.execute(&request).await {
                Ok(response) => {
                    self.observer.on_event(&RunEvent::RequestCompleted {
                        test_id: &test.id,
                        url: &request.url,
                        attempt,
                        status: response.status,
                        latency_ms: response.latency_ms,
                    });
                    result.latency_ms += response.latency_ms;
                    result.status = response.status;
                    result.body = response.body;
                }
                Err(failure) => {
                    result.latency_ms += failure.latency_ms;
                    let error = failure.error.to_string();
                    self.observer.on_event(&RunEvent::RequestFailed {
                        test_id: &test.id,
                        url: &request.url,
                        attempt,
                        error: &error,
                    });
                    return result.fail(
                        FailureKind::TransportError,
                        "Request did not complete successfully.",
                        error,
                    );
                }
            }
        }

        if !status_matches(result.status, &expectation.status) {
            let why = status_mismatch_reason(&expectation.status, result.status, &result.body);
            let error = format!(
                "status mismatch (got={} expected={:?})",
                result.status, expectation.status
            );
            return result.fail(FailureKind::StatusMismatch, why, error);
        }

        if let Some(expected) = &expectation.content {
            let Ok(actual) = serde_json::from_str::<Value>(&result.body) else {
                return result.fail(
                    FailureKind::ResponseParseError,
                    "Expected structured content, but response body is not valid JSON.",
                    "response content is not valid JSON",
                );
            };

            let mode = NumericMode::from_relaxed(behavior.relaxed_numbers);
            if let Some(divergence) = first_divergence(expected, &actual, mode) {
                return result.fail(
                    FailureKind::ContentMismatch,
                    content_mismatch_reason(&divergence),
                    "response content mismatch",
                );
            }
        }

        result.pass()
    }
}
