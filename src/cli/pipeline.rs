//! End-to-end flows behind the CLI commands.

use std::path::Path;

use tracing::{info, warn};

use crate::environment::{Settings, UnittestConfig, effective_base_url};
use crate::error::{Error, Result};
use crate::history::History;
use crate::http::client::Executor;
use crate::remote::{REMOTE_TIMEOUT, RemoteClient};
use crate::spec::TestSpec;
use crate::storage;
use crate::testing::{RunObserver, SuiteRunner, UnittestReport};

/// Run `spec`, persist the report and record the run in the history store.
pub async fn run_suite<O: RunObserver>(
    spec: &TestSpec,
    config: &UnittestConfig,
    settings: &Settings,
    observer: O,
) -> Result<UnittestReport> {
    let executor = Executor::new(settings.request_timeout)?;
    let base_url = effective_base_url(spec, config).to_string();
    if base_url.trim().is_empty() {
        warn!("no base URL in config or spec; every case will fail to build");
    }

    let mut runner = SuiteRunner::new(executor, config, observer);
    let mut report = runner.run(spec, &base_url).await;

    let path = storage::write_report(&settings.report_path, &mut report)?;
    info!(path = %path.display(), "report persisted");

    if let Some(db) = &settings.history_db {
        if let Err(err) = record_history(db, &base_url, &report, &path) {
            warn!(db = %db.display(), error = %err, "failed to record run history");
        }
    }

    Ok(report)
}

/// Generate a spec from API documentation through the remote service and run
/// it with the repository's stored configuration.
pub async fn run_from_documentation<O: RunObserver>(
    repo_id: &str,
    documentation_path: &Path,
    identity_token: &str,
    settings: &Settings,
    observer: O,
) -> Result<UnittestReport> {
    if !documentation_path.exists() {
        return Err(Error::Config(format!(
            "given path does not exist: {}",
            documentation_path.display()
        )));
    }

    let remote = RemoteClient::new(settings.require_api_base_url()?, REMOTE_TIMEOUT)?;
    remote.validate_identity(repo_id, identity_token).await?;

    let config = remote.fetch_config(repo_id).await?;
    info!(repo_id, "config fetched");

    let documentation = storage::read_documentation(documentation_path)?;
    info!(bytes = documentation.len(), "documentation loaded");

    let mut spec = remote.fetch_spec(&documentation, &config).await?;
    if spec.endpoints.is_empty() {
        return Err(Error::EmptySpec);
    }
    if settings.naming_conventions {
        spec.apply_naming_conventions();
    }

    run_suite(&spec, &config, settings, observer).await
}

/// Run a spec stored in a local JSON file.
pub async fn run_from_file<O: RunObserver>(
    spec_path: &Path,
    config: &UnittestConfig,
    settings: &Settings,
    observer: O,
) -> Result<UnittestReport> {
    let mut spec = storage::load_spec(spec_path)?;
    info!(
        path = %spec_path.display(),
        endpoints = spec.endpoints.len(),
        cases = spec.case_count(),
        "spec loaded"
    );
    if settings.naming_conventions {
        spec.apply_naming_conventions();
    }

    run_suite(&spec, config, settings, observer).await
}

fn record_history(db: &Path, base_url: &str, report: &UnittestReport, report_path: &Path) -> Result<()> {
    let history = History::open(db)?;
    history.record(base_url, &report.summary, Some(report_path))?;
    Ok(())
}
