//! webapp-publisher core library
//!
//! Provides the publish pipeline run as a CI step:
//! - Downloads `azioncli` and marks it executable
//! - Initializes the edge application project when needed
//! - Writes type-specific configuration (credentials, KV descriptor)
//! - Publishes through the vendor CLI
//! - Optionally commits the `azion/` directory back to the repository

pub mod command;
pub mod commit;
pub mod config;
pub mod configurator;
pub mod env;
pub mod error;
pub mod fakes;
pub mod initializer;
pub mod obs;
pub mod pipeline;
pub mod probe;
pub mod provision;
pub mod publisher;
pub mod telemetry;
pub mod vendor;

// Re-export key types
pub use command::{CommandOutcome, CommandRunner, CommandSpec, ProcessRunner};
pub use commit::{commit_gate, maybe_commit, CommitOutcome, GitClient, PushCredentials};
pub use config::{
    DispatchPlan, ExistingProjectPolicy, ProjectType, RunConfiguration, Secret, Timeouts,
};
pub use configurator::{
    configure_project, write_credentials_file, write_kv_descriptor, ConfiguredFiles, KvDescriptor,
};
pub use env::{EnvSource, MapEnv, ProcessEnv};
pub use error::{PublisherError, Result};
pub use initializer::{initialize, should_initialize};
pub use obs::{
    emit_command_executed, emit_run_finished, emit_run_started, emit_stage_failed,
    emit_stage_finished, emit_stage_skipped, run_span,
};
pub use pipeline::{PipelineReport, PublishPipeline, Stage, StageRecord, StageStatus};
pub use probe::{probe, DirectoryState};
pub use provision::{BinarySource, HttpProvisioner, ProvisionedBinary, DEFAULT_DOWNLOAD_URL};
pub use publisher::publish;
pub use telemetry::init_tracing;
pub use vendor::VendorCli;
