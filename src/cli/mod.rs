//! # CLI
//!
//! Command-line entry points for running suites in CI pipelines:
//!
//! - `synrax read <repo_id> <file> <oidc_token>`: generate and run a suite
//!   from API documentation
//! - `synrax run --spec suite.json`: run a suite from a local file
//! - `synrax history`: list recent runs

pub mod pipeline;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::environment::{API_BASE_URL_VAR, AUTH_TOKEN_VAR, BASE_URL_VAR, Settings, UnittestConfig, defaults};
use crate::history::History;
use crate::testing::{TracingObserver, UnittestReport};

/// Run declarative HTTP API test suites and report why cases fail
#[derive(Debug, Parser)]
#[command(name = "synrax")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Summary format on stdout
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 15, global = true)]
    pub timeout_secs: u64,

    /// SQLite file recording past runs
    #[arg(long, default_value = defaults::HISTORY_DB_PATH, global = true)]
    pub history_db: PathBuf,

    /// Do not record this run in the history database
    #[arg(long, global = true)]
    pub no_history: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a suite from API documentation and run it against the repository's API
    Read(ReadArgs),

    /// Run a suite stored in a local JSON file
    Run(RunArgs),

    /// Show recent runs
    History {
        /// Number of runs to show
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

#[derive(Debug, Args)]
pub struct ReadArgs {
    /// Repository whose configuration is used
    pub repo_id: String,

    /// API documentation to generate the suite from
    pub file_path: PathBuf,

    /// CI identity token proving access to the repository
    pub oidc_token: String,

    /// Base URL of the spec, config and identity service
    #[arg(long, env = API_BASE_URL_VAR)]
    pub api_base_url: Option<String>,

    #[command(flatten)]
    pub suite: SuiteArgs,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Test spec JSON file
    #[arg(long)]
    pub spec: PathBuf,

    /// Overrides the spec's base URL
    #[arg(long, env = BASE_URL_VAR)]
    pub base_url: Option<String>,

    /// Bearer token injected into requests
    #[arg(long, env = AUTH_TOKEN_VAR, hide_env_values = true)]
    pub token: Option<String>,

    #[command(flatten)]
    pub suite: SuiteArgs,
}

#[derive(Debug, Clone, Args)]
pub struct SuiteArgs {
    /// Where to write the JSON report
    #[arg(long, default_value = defaults::REPORT_PATH)]
    pub report: PathBuf,

    /// Ignore test id naming conventions; only explicit behavior fields apply
    #[arg(long)]
    pub explicit_behaviors: bool,

    /// Exit with status 1 when any test case failed
    #[arg(long)]
    pub fail_on_case_failure: bool,
}

/// Output format for CLI reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl Cli {
    pub fn settings(&self, suite: &SuiteArgs, api_base_url: Option<String>) -> Settings {
        Settings {
            api_base_url,
            request_timeout: Duration::from_secs(self.timeout_secs),
            report_path: suite.report.clone(),
            history_db: (!self.no_history).then(|| self.history_db.clone()),
            naming_conventions: !suite.explicit_behaviors,
        }
    }
}

pub async fn execute(cli: Cli) -> anyhow::Result<ExitCode> {
    match &cli.command {
        Command::Read(args) => {
            let settings = cli.settings(&args.suite, args.api_base_url.clone());
            let report = pipeline::run_from_documentation(
                &args.repo_id,
                &args.file_path,
                &args.oidc_token,
                &settings,
                TracingObserver,
            )
            .await
            .with_context(|| format!("unittest run failed for repo `{}`", args.repo_id))?;
            finish(&report, cli.format, &args.suite)
        }
        Command::Run(args) => {
            let settings = cli.settings(&args.suite, None);
            let config = UnittestConfig {
                auth_token: args.token.clone().unwrap_or_default(),
                base_url: args.base_url.clone().unwrap_or_default(),
            };
            let report = pipeline::run_from_file(&args.spec, &config, &settings, TracingObserver)
                .await
                .with_context(|| format!("failed to run spec `{}`", args.spec.display()))?;
            finish(&report, cli.format, &args.suite)
        }
        Command::History { limit } => {
            let history = History::open(&cli.history_db)
                .with_context(|| format!("failed to open history `{}`", cli.history_db.display()))?;
            let entries = history.entries(*limit)?;
            match cli.format {
                OutputFormat::Json => {
                    let rows: Vec<_> = entries
                        .iter()
                        .map(|entry| {
                            serde_json::json!({
                                "id": entry.id,
                                "timestamp": entry.timestamp,
                                "base_url": entry.base_url,
                                "summary": entry.summary,
                                "report_path": entry.report_path,
                            })
                        })
                        .collect();
                    println!("{}", serde_json::to_string_pretty(&rows)?);
                }
                OutputFormat::Text => {
                    for entry in &entries {
                        println!(
                            "#{:<4} {:>10}  {:>3}/{:<3} passed  {}",
                            entry.id,
                            entry.timestamp,
                            entry.summary.passed,
                            entry.summary.total,
                            entry.base_url
                        );
                    }
                }
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn finish(report: &UnittestReport, format: OutputFormat, suite: &SuiteArgs) -> anyhow::Result<ExitCode> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Text => print!("{}", render_text(report)),
    }

    if suite.fail_on_case_failure && !report.all_passed() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

pub fn render_text(report: &UnittestReport) -> String {
    let mut out = String::new();
    for result in &report.results {
        let mark = if result.passed { "PASS" } else { "FAIL" };
        out.push_str(&format!(
            "{mark} {} {} [{}] status={} {}ms\n",
            result.method, result.endpoint, result.test_id, result.status, result.latency_ms
        ));
        if let Some(kind) = result.failure {
            out.push_str(&format!("     {kind}: {}\n", result.why));
        }
    }
    let summary = report.summary;
    out.push_str(&format!(
        "\n{} total, {} passed, {} failed\n",
        summary.total, summary.passed, summary.failed
    ));
    out
}
