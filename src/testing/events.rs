//! Structured progress events emitted by the suite runner.
//!
//! The runner never logs on its own; it reports what happened to a
//! [`RunObserver`]. [`TracingObserver`] forwards events to `tracing`.

use tracing::{debug, info, warn};

use crate::http::method::HttpMethod;

use super::report::{CaseResult, UnittestSummary};

#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent<'a> {
    RunStarted {
        base_url: &'a str,
        endpoints: usize,
        cases: usize,
    },
    EndpointStarted {
        endpoint: &'a str,
        method: HttpMethod,
        tests: usize,
    },
    CaseStarted {
        endpoint: &'a str,
        test_id: &'a str,
    },
    RequestCompleted {
        test_id: &'a str,
        url: &'a str,
        attempt: u32,
        status: u16,
        latency_ms: u64,
    },
    RequestFailed {
        test_id: &'a str,
        url: &'a str,
        attempt: u32,
        error: &'a str,
    },
    CaseFinished {
        result: &'a CaseResult,
    },
    RunFinished {
        summary: UnittestSummary,
    },
}

impl RunEvent<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            RunEvent::RunStarted { .. } => "run_started",
            RunEvent::EndpointStarted { .. } => "endpoint_started",
            RunEvent::CaseStarted { .. } => "case_started",
            RunEvent::RequestCompleted { .. } => "request_completed",
            RunEvent::RequestFailed { .. } => "request_failed",
            RunEvent::CaseFinished { .. } => "case_finished",
            RunEvent::RunFinished { .. } => "run_finished",
        }
    }

    pub fn test_id(&self) -> Option<&str> {
        match self {
            RunEvent::CaseStarted { test_id, .. }
            | RunEvent::RequestCompleted { test_id, .. }
            | RunEvent::RequestFailed { test_id, .. } => Some(*test_id),
            RunEvent::CaseFinished { result } => Some(result.test_id.as_str()),
            _ => None,
        }
    }
}

pub trait RunObserver {
    fn on_event(&mut self, event: &RunEvent<'_>);
}

impl<O: RunObserver + ?Sized> RunObserver for &mut O {
    fn on_event(&mut self, event: &RunEvent<'_>) {
        (**self).on_event(event);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl RunObserver for NoopObserver {
    fn on_event(&mut self, _event: &RunEvent<'_>) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl RunObserver for TracingObserver {
    fn on_event(&mut self, event: &RunEvent<'_>) {
        match event {
            RunEvent::RunStarted {
                base_url,
                endpoints,
                cases,
            } => info!(base_url, endpoints, cases, "run started"),
            RunEvent::EndpointStarted {
                endpoint,
                method,
                tests,
            } => info!(endpoint, method = %method, tests, "endpoint"),
            RunEvent::CaseStarted { endpoint, test_id } => debug!(endpoint, test_id, "case started"),
            RunEvent::RequestCompleted {
                test_id,
                url,
                attempt,
                status,
                latency_ms,
            } => debug!(test_id, url, attempt, status, latency_ms, "response received"),
            RunEvent::RequestFailed {
                test_id,
                url,
                attempt,
                error,
            } => warn!(test_id, url, attempt, error, "request failed"),
            RunEvent::CaseFinished { result } => {
                if result.passed {
                    info!(
                        endpoint = %result.endpoint,
                        test_id = %result.test_id,
                        status = result.status,
                        latency_ms = result.latency_ms,
                        "case passed"
                    );
                } else {
                    let failure = result.failure.map(|kind| kind.as_str()).unwrap_or_default();
                    warn!(
                        endpoint = %result.endpoint,
                        test_id = %result.test_id,
                        status = result.status,
                        failure,
                        why = %result.why,
                        "case failed"
                    );
                }
            }
            RunEvent::RunFinished { summary } => info!(
                total = summary.total,
                passed = summary.passed,
                failed = summary.failed,
                "run completed"
            ),
        }
    }
}

/// Keeps the kind and test id of every event, in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    pub events: Vec<(&'static str, Option<String>)>,
}

impl RecordingObserver {
    pub fn count(&self, kind: &str, test_id: &str) -> usize {
        self.events
            .iter()
            .filter(|(k, id)| *k == kind && id.as_deref() == Some(test_id))
            .count()
    }
}

impl RunObserver for RecordingObserver {
    fn on_event(&mut self, event: &RunEvent<'_>) {
        self.events.push((event.kind(), event.test_id().map(str::to_string)));
    }
}
