//! # Environment & Configuration
//!
//! The per-repository configuration fetched from the config store, and the
//! process-level settings the CLI assembles from flags and environment
//! variables.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};
use crate::http::client::DEFAULT_TIMEOUT;
use crate::spec::TestSpec;

pub const API_BASE_URL_VAR: &str = "SYNRAX_API_BASE_URL";
pub const BASE_URL_VAR: &str = "SYNRAX_BASE_URL";
pub const AUTH_TOKEN_VAR: &str = "SYNRAX_AUTH_TOKEN";

pub mod defaults {
    pub const REPORT_PATH: &str = "./report.json";
    pub const HISTORY_DB_PATH: &str = "./.synrax/history.db";
}

/// User configuration for a run: where the API lives and how to
/// authenticate against it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnittestConfig {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub auth_token: String,
    /// e.g. `http://localhost:8000`
    #[serde(rename = "base", default, deserialize_with = "null_as_empty")]
    pub base_url: String,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl UnittestConfig {
    pub fn token(&self) -> Option<&str> {
        Some(self.auth_token.trim()).filter(|token| !token.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.auth_token.trim().is_empty() && self.base_url.trim().is_empty()
    }
}

/// Configuration base URL wins over the spec's own when it is set.
pub fn effective_base_url<'a>(spec: &'a TestSpec, config: &'a UnittestConfig) -> &'a str {
    if config.base_url.trim().is_empty() {
        &spec.base_url
    } else {
        &config.base_url
    }
}

pub fn is_absolute_url(raw: &str) -> bool {
    Url::parse(raw.trim())
        .map(|url| url.has_host() && !url.scheme().is_empty())
        .unwrap_or(false)
}

/// Process-wide settings for one invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Spec generator / config store / identity service
    pub api_base_url: Option<String>,
    pub request_timeout: Duration,
    pub report_path: PathBuf,
    /// Run ledger location; `None` disables recording
    pub history_db: Option<PathBuf>,
    /// Infer behaviors from test identifiers for tests without one
    pub naming_conventions: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: None,
            request_timeout: DEFAULT_TIMEOUT,
            report_path: PathBuf::from(defaults::REPORT_PATH),
            history_db: Some(PathBuf::from(defaults::HISTORY_DB_PATH)),
            naming_conventions: true,
        }
    }
}

impl Settings {
    /// The remote API base, required by commands that talk to it.
    pub fn require_api_base_url(&self) -> Result<&str> {
        match self.api_base_url.as_deref().map(str::trim) {
            Some(base) if !base.is_empty() => Ok(base.trim_end_matches('/')),
            _ => Err(Error::Config(format!("{API_BASE_URL_VAR} is empty"))),
        }
    }
}
