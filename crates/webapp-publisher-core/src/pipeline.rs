//! Publish pipeline orchestration.

use std::future::Future;
use std::path::PathBuf;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, Instrument};
use uuid::Uuid;

use crate::command::CommandRunner;
use crate::commit::{maybe_commit, CommitOutcome};
use crate::config::{ProjectType, RunConfiguration};
use crate::configurator::configure_project;
use crate::error::Result;
use crate::initializer::{initialize, should_initialize};
use crate::obs;
use crate::probe::{probe, DirectoryState};
use crate::provision::{BinarySource, ProvisionedBinary};
use crate::publisher::publish;
use crate::vendor::VendorCli;

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Dispatch,
    Provision,
    Initialize,
    Configure,
    Publish,
    Commit,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Dispatch => "dispatch",
            Stage::Provision => "provision",
            Stage::Initialize => "initialize",
            Stage::Configure => "configure",
            Stage::Publish => "publish",
            Stage::Commit => "commit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Completed,
    Skipped,
    Failed,
}

/// Timing and status of one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageRecord {
    pub stage: Stage,
    pub status: StageStatus,
    pub duration_ms: u64,
}

/// Result of a successful pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub project_name: String,
    pub project_type: ProjectType,
    pub binary: ProvisionedBinary,
    /// State of the project directory before the run.
    pub directory_state: DirectoryState,
    pub initialized: bool,
    pub credentials_file: Option<PathBuf>,
    pub kv_descriptor: Option<PathBuf>,
    pub publish_stdout: String,
    pub commit: CommitOutcome,
    pub stages: Vec<StageRecord>,
    pub duration_ms: u64,
}

impl PipelineReport {
    /// Stages that actually ran to completion.
    pub fn completed_stages(&self) -> Vec<Stage> {
        self.stages
            .iter()
            .filter(|r| r.status == StageStatus::Completed)
            .map(|r| r.stage)
            .collect()
    }
}

#[derive(Debug, Default)]
struct StageLog {
    records: Vec<StageRecord>,
}

impl StageLog {
    async fn track<T, F>(&mut self, stage: Stage, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        obs::emit_stage_started(stage.name());
        let start = Instant::now();
        let result = fut.await;
        let duration_ms = start.elapsed().as_millis() as u64;

        let status = match &result {
            Ok(_) => {
                obs::emit_stage_finished(stage.name(), duration_ms);
                StageStatus::Completed
            }
            Err(e) => {
                obs::emit_stage_failed(stage.name(), e);
                StageStatus::Failed
            }
        };
        self.records.push(StageRecord {
            stage,
            status,
            duration_ms,
        });
        result
    }

    fn skip(&mut self, stage: Stage, reason: &str) {
        obs::emit_stage_skipped(stage.name(), reason);
        self.records.push(StageRecord {
            stage,
            status: StageStatus::Skipped,
            duration_ms: 0,
        });
    }
}

/// The publish pipeline.
///
/// Runs dispatch, provision, initialize, configure, publish and commit in
/// order. The first error aborts the run; completed stages are not rolled
/// back.
pub struct PublishPipeline<'a> {
    config: &'a RunConfiguration,
    source: &'a dyn BinarySource,
    runner: &'a dyn CommandRunner,
}

impl<'a> PublishPipeline<'a> {
    pub fn new(
        config: &'a RunConfiguration,
        source: &'a dyn BinarySource,
        runner: &'a dyn CommandRunner,
    ) -> Self {
        Self {
            config,
            source,
            runner,
        }
    }

    pub async fn run(&self) -> Result<PipelineReport> {
        let run_id = Uuid::new_v4().to_string();
        let started_at = Utc::now();
        let start = Instant::now();
        let span = obs::run_span(&run_id, &self.config.project_name);

        async {
            obs::emit_run_started(&run_id, self.config.project_type.as_str());
            let result = self.execute(&run_id, started_at, start).await;
            obs::emit_run_finished(&run_id, start.elapsed().as_millis() as u64, result.is_ok());
            result
        }
        .instrument(span)
        .await
    }

    async fn execute(
        &self,
        run_id: &str,
        started_at: DateTime<Utc>,
        start: Instant,
    ) -> Result<PipelineReport> {
        let config = self.config;
        let mut log = StageLog::default();

        // Unsupported types fail before anything is downloaded or spawned.
        let plan = log
            .track(Stage::Dispatch, async { config.project_type.plan() })
            .await?;

        let binary = log
            .track(
                Stage::Provision,
                self.source.provision(&config.binary_path()),
            )
            .await?;

        let vendor = VendorCli::new(
            &binary,
            self.runner,
            config.workspace(),
            config.timeouts.command,
        );

        let project_dir = config.project_dir();
        let decision = probe(&project_dir).and_then(|state| {
            should_initialize(
                state,
                config.force_init,
                config.existing_project,
                &project_dir,
            )
            .map(|should| (state, should))
        });
        let (directory_state, initialized) = match decision {
            Ok((state, true)) => {
                log.track(Stage::Initialize, initialize(&vendor, config))
                    .await?;
                (state, true)
            }
            Ok((state, false)) => {
                log.skip(
                    Stage::Initialize,
                    "project already present or FORCE_INIT=false",
                );
                (state, false)
            }
            Err(e) => return log.track(Stage::Initialize, async move { Err(e) }).await,
        };

        let (credentials_file, kv_descriptor) = if plan.requires_credentials {
            let files = log
                .track(Stage::Configure, async { configure_project(config, &plan) })
                .await?;
            (Some(files.credentials_file), files.kv_descriptor)
        } else {
            log.skip(Stage::Configure, "project type needs no extra configuration");
            (None, None)
        };

        let published = log
            .track(Stage::Publish, publish(&vendor, config))
            .await?;

        let commit = log
            .track(Stage::Commit, maybe_commit(self.runner, config))
            .await?;

        info!(run_id = %run_id, initialized = initialized, commit = ?commit, "Publish pipeline completed");

        Ok(PipelineReport {
            run_id: run_id.to_string(),
            started_at,
            project_name: config.project_name.clone(),
            project_type: config.project_type.clone(),
            binary,
            directory_state,
            initialized,
            credentials_file,
            kv_descriptor,
            publish_stdout: published.stdout,
            commit,
            stages: log.records,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PublisherError;

    #[test]
    fn test_stage_names() {
        assert_eq!(Stage::Dispatch.name(), "dispatch");
        assert_eq!(Stage::Provision.name(), "provision");
        assert_eq!(Stage::Initialize.name(), "initialize");
        assert_eq!(Stage::Configure.name(), "configure");
        assert_eq!(Stage::Publish.name(), "publish");
        assert_eq!(Stage::Commit.name(), "commit");
    }

    #[tokio::test]
    async fn test_stage_log_records_status() {
        let mut log = StageLog::default();
        log.track(Stage::Dispatch, async { Ok(()) }).await.unwrap();
        log.skip(Stage::Configure, "not needed");
        let failed: Result<()> = log
            .track(Stage::Publish, async {
                Err(PublisherError::Configuration("x".to_string()))
            })
            .await;
        assert!(failed.is_err());

        let statuses: Vec<_> = log.records.iter().map(|r| (r.stage, r.status)).collect();
        assert_eq!(
            statuses,
            vec![
                (Stage::Dispatch, StageStatus::Completed),
                (Stage::Configure, StageStatus::Skipped),
                (Stage::Publish, StageStatus::Failed),
            ]
        );
    }
}
