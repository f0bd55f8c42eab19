//! webapp-publisher - CI entry point
//!
//! Reads the run configuration from the process environment, then
//! provisions `azioncli`, initializes the project if needed, publishes it
//! and optionally commits the `azion/` directory.
//!
//! ## Environment
//!
//! - `GITHUB_WORKSPACE`, `PROJECT_NAME`, `PROJECT_TYPE`, `AZION_TOKEN` (required)
//! - `FORCE_INIT`, `SETUP_KV` + `KV_BUCKET`/`KV_REGION`/`KV_PATH`
//! - `AWS_ACCESS_KEY_ID`/`AWS_SECRET_ACCESS_KEY` (nextjs, flareact)
//! - `SHOULD_COMMIT` + `PUSH_USER`/`PUSH_TOKEN`

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};

use webapp_publisher_core::{
    init_tracing, CommitOutcome, ExistingProjectPolicy, HttpProvisioner, PipelineReport,
    ProcessEnv, ProcessRunner, PublishPipeline, RunConfiguration, StageStatus, Timeouts,
    DEFAULT_DOWNLOAD_URL,
};

#[derive(Parser)]
#[command(name = "webapp-publisher")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Provision azioncli, initialize and publish an edge web application", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, env = "PUBLISHER_JSON_LOGS")]
    json: bool,

    /// What to do when azion/ already has content and FORCE_INIT is unset
    #[arg(long, env = "PUBLISHER_ON_EXISTING", default_value = "skip")]
    on_existing: ExistingProjectPolicy,

    /// Timeout for each vendor or git command, in seconds
    #[arg(long, env = "PUBLISHER_COMMAND_TIMEOUT_SECS", default_value_t = 600)]
    command_timeout_secs: u64,

    /// Timeout for the vendor binary download, in seconds
    #[arg(long, env = "PUBLISHER_DOWNLOAD_TIMEOUT_SECS", default_value_t = 300)]
    download_timeout_secs: u64,

    /// Location of the vendor binary
    #[arg(long, env = "PUBLISHER_DOWNLOAD_URL", default_value = DEFAULT_DOWNLOAD_URL)]
    download_url: String,

    /// Write the run report as JSON to this path
    #[arg(long)]
    report: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    let working_dir = std::env::current_dir().context("Failed to read working directory")?;
    let timeouts = Timeouts {
        download: Duration::from_secs(cli.download_timeout_secs),
        command: Duration::from_secs(cli.command_timeout_secs),
    };
    let config = RunConfiguration::from_env(&ProcessEnv, working_dir)
        .context("Invalid run configuration")?
        .with_existing_project_policy(cli.on_existing)
        .with_timeouts(timeouts);

    let source = HttpProvisioner::new(&cli.download_url, timeouts.download)?;
    let runner = ProcessRunner;

    let report = PublishPipeline::new(&config, &source, &runner)
        .run()
        .await
        .context("Publish pipeline failed")?;

    if let Some(path) = &cli.report {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        info!(path = %path.display(), "Wrote run report");
    }

    print_summary(&report);
    Ok(())
}

fn print_summary(report: &PipelineReport) {
    println!(
        "Published {} ({}) in {} ms",
        report.project_name, report.project_type, report.duration_ms
    );
    println!("  run id:      {}", report.run_id);
    println!(
        "  binary:      {} (sha256 {})",
        report.binary.path.display(),
        report.binary.sha256
    );
    println!("  initialized: {}", report.initialized);
    if let Some(path) = &report.credentials_file {
        println!("  credentials: {}", path.display());
    }
    if let Some(path) = &report.kv_descriptor {
        println!("  kv:          {}", path.display());
    }
    let commit = match report.commit {
        CommitOutcome::Disabled => "disabled",
        CommitOutcome::Pushed => "pushed",
        CommitOutcome::AlreadyUpToDate => "already up to date",
    };
    println!("  commit:      {commit}");
    for record in &report.stages {
        let status = match record.status {
            StageStatus::Completed => "ok",
            StageStatus::Skipped => "skipped",
            StageStatus::Failed => "failed",
        };
        println!(
            "    {:<10} {:<8} {} ms",
            record.stage.name(),
            status,
            record.duration_ms
        );
    }
}
