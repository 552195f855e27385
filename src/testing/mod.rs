//! # Testing & Assertions
//!
//! Executes a test spec against a live API and explains every failure.
//!
//! - [`assertion`]: status and structural content matching, failure reasons
//! - [`runner`]: sequential suite execution
//! - [`report`]: per-case results and the run summary
//! - [`events`]: progress events for observers

pub mod assertion;
pub mod events;
pub mod report;
pub mod runner;

pub use events::{NoopObserver, RecordingObserver, RunEvent, RunObserver, TracingObserver};
pub use report::{CaseResult, FailureKind, UnittestReport, UnittestSummary};
pub use runner::SuiteRunner;
