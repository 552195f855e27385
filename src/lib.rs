//! Declarative HTTP API test runner.
//!
//! A [`spec::TestSpec`] lists endpoints and test cases; [`testing::SuiteRunner`]
//! executes them one at a time against a live API and produces a
//! [`testing::UnittestReport`] that says why each failed case failed.

pub mod auth;
pub mod cli;
pub mod environment;
pub mod error;
pub mod history;
pub mod http;
pub mod remote;
pub mod spec;
pub mod storage;
pub mod testing;

pub use error::{Error, Result};
