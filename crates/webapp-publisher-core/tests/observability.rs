//! Observability tests for publish run lifecycle tracing.
//!
//! Verifies that run and stage events are emitted, and that secrets never
//! reach the log output.

use tracing_test::traced_test;
use webapp_publisher_core::env::vars;
use webapp_publisher_core::fakes::{ScriptedRunner, StubBinarySource};
use webapp_publisher_core::{
    emit_command_executed, emit_run_finished, emit_run_started, emit_stage_failed,
    emit_stage_skipped, run_span, CommandOutcome, MapEnv, PublishPipeline, RunConfiguration,
};

/// Test: emit_run_started creates an info-level event
#[traced_test]
#[test]
fn test_emit_run_started_logs_run_id_and_type() {
    emit_run_started("run-123", "nextjs");
    assert!(logs_contain("run.started"));
    assert!(logs_contain("run-123"));
}

/// Test: emit_run_finished records success
#[traced_test]
#[test]
fn test_emit_run_finished_logs_duration() {
    emit_run_finished("run-456", 5000, true);
    assert!(logs_contain("run.finished"));
    assert!(logs_contain("duration_ms=5000"));
}

#[traced_test]
#[test]
fn test_emit_stage_events() {
    emit_stage_skipped("configure", "not needed");
    emit_stage_failed("publish", &"exit status 1");
    assert!(logs_contain("stage.skipped"));
    assert!(logs_contain("stage.failed"));
    assert!(logs_contain("WARN"));
}

#[traced_test]
#[test]
fn test_emit_command_executed() {
    emit_command_executed("/work/azioncli webapp publish", Some(0), 12);
    assert!(logs_contain("command.executed"));
    assert!(logs_contain("webapp publish"));
}

/// Test: run_span can be entered and nested events still log
#[traced_test]
#[test]
fn test_run_span_wraps_events() {
    let _entered = run_span("span-run", "storefront").entered();
    emit_stage_skipped("initialize", "already present");
    assert!(logs_contain("span-run"));
}

fn nextjs_env(workspace: &std::path::Path) -> MapEnv {
    MapEnv::new()
        .with(vars::GITHUB_WORKSPACE, workspace.to_str().unwrap())
        .with(vars::PROJECT_NAME, "storefront")
        .with(vars::PROJECT_TYPE, "nextjs")
        .with(vars::AZION_TOKEN, "tok-very-secret")
        .with(vars::AWS_ACCESS_KEY_ID, "AKIA-secret-id")
        .with(vars::AWS_SECRET_ACCESS_KEY, "aws-secret-key")
}

#[tokio::test]
#[traced_test]
async fn test_pipeline_run_logs_lifecycle_without_secrets() {
    let workspace = tempfile::tempdir().unwrap();
    let working_dir = tempfile::tempdir().unwrap();
    let config = RunConfiguration::from_env(&nextjs_env(workspace.path()), working_dir.path())
        .unwrap();

    let source = StubBinarySource::new();
    let runner = ScriptedRunner::new();
    PublishPipeline::new(&config, &source, &runner)
        .run()
        .await
        .unwrap();

    assert!(logs_contain("run.started"));
    assert!(logs_contain("stage.finished"));
    assert!(logs_contain("run.finished"));
    assert!(!logs_contain("tok-very-secret"));
    assert!(!logs_contain("AKIA-secret-id"));
    assert!(!logs_contain("aws-secret-key"));
}

#[tokio::test]
#[traced_test]
async fn test_failed_stage_logs_warning() {
    let workspace = tempfile::tempdir().unwrap();
    let working_dir = tempfile::tempdir().unwrap();
    let config = RunConfiguration::from_env(&nextjs_env(workspace.path()), working_dir.path())
        .unwrap();

    let source = StubBinarySource::new();
    let runner = ScriptedRunner::new()
        .respond(&["webapp", "publish"], CommandOutcome::failed(2, "quota exceeded"));
    let result = PublishPipeline::new(&config, &source, &runner).run().await;

    assert!(result.is_err());
    assert!(logs_contain("stage.failed"));
    assert!(logs_contain("quota exceeded"));
}
