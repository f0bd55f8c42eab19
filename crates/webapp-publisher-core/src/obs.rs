//! Structured observability hooks for the publish pipeline.
//!
//! This module provides:
//! - A run-scoped tracing span via [`run_span`]
//! - Emission functions for run and stage lifecycle events
//!
//! Events are emitted at `info!` level (filter with `RUST_LOG`).
//! The CLI's `--json` flag switches the subscriber to JSON lines.

use tracing::{info, warn};

/// Span that tags every event of one run with its id and project name.
///
/// # Example
///
/// ```ignore
/// async { /* pipeline stages */ }
///     .instrument(run_span("4b0f...", "storefront"))
///     .await;
/// ```
pub fn run_span(run_id: &str, project: &str) -> tracing::Span {
    tracing::info_span!("webapp_publisher.run", run_id = %run_id, project = %project)
}

/// Emit event: run started.
pub fn emit_run_started(run_id: &str, project_type: &str) {
    info!(event = "run.started", run_id = %run_id, project_type = %project_type);
}

/// Emit event: run finished with duration and success status.
pub fn emit_run_finished(run_id: &str, duration_ms: u64, success: bool) {
    info!(
        event = "run.finished",
        run_id = %run_id,
        duration_ms = duration_ms,
        success = success,
    );
}

/// Emit event: a stage began.
pub fn emit_stage_started(stage: &str) {
    info!(event = "stage.started", stage = %stage);
}

/// Emit event: a stage completed.
pub fn emit_stage_finished(stage: &str, duration_ms: u64) {
    info!(event = "stage.finished", stage = %stage, duration_ms = duration_ms);
}

/// Emit event: a stage was not needed for this run.
pub fn emit_stage_skipped(stage: &str, reason: &str) {
    info!(event = "stage.skipped", stage = %stage, reason = %reason);
}

/// Emit event: a stage failed and the run will abort (warning level).
pub fn emit_stage_failed(stage: &str, error: &dyn std::fmt::Display) {
    warn!(event = "stage.failed", stage = %stage, error = %error);
}

/// Emit event: an external command exited. The command line must already
/// have secrets masked.
pub fn emit_command_executed(command: &str, exit_code: Option<i32>, duration_ms: u64) {
    info!(
        event = "command.executed",
        command = %command,
        exit_code = ?exit_code,
        duration_ms = duration_ms,
    );
}
