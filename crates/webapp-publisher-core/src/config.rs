//! Run configuration and project type dispatch.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::env::{lookup_bool, require, vars, EnvSource};
use crate::error::{PublisherError, Result};

/// Directory created by `webapp init` inside the workspace.
pub const PROJECT_DIR_NAME: &str = "azion";

/// Credentials file written for nextjs/flareact projects.
pub const CREDENTIALS_FILE_NAME: &str = "webdev.env";

/// Key-value store descriptor file name.
pub const KV_DESCRIPTOR_FILE_NAME: &str = "kv.js";

/// Local file name of the downloaded vendor binary.
pub const BINARY_NAME: &str = "azioncli";

/// A value that must never appear in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Secret(value.into())
    }

    /// The raw value, for handing to a subprocess or a file.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Declared project type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    Javascript,
    Nextjs,
    Flareact,
    /// Anything else. Kept verbatim so the error can name it.
    Unsupported(String),
}

impl ProjectType {
    /// Parse the raw `PROJECT_TYPE` value. Never fails; unknown values are
    /// rejected later by [`ProjectType::plan`].
    pub fn parse(raw: &str) -> Self {
        match raw {
            "javascript" => ProjectType::Javascript,
            "nextjs" => ProjectType::Nextjs,
            "flareact" => ProjectType::Flareact,
            other => ProjectType::Unsupported(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ProjectType::Javascript => "javascript",
            ProjectType::Nextjs => "nextjs",
            ProjectType::Flareact => "flareact",
            ProjectType::Unsupported(raw) => raw,
        }
    }

    /// Decide which configuration steps this type needs before publishing.
    pub fn plan(&self) -> Result<DispatchPlan> {
        match self {
            ProjectType::Javascript => Ok(DispatchPlan {
                requires_credentials: false,
                honors_kv_setup: false,
            }),
            // flareact and nextjs follow the same steps
            ProjectType::Nextjs | ProjectType::Flareact => Ok(DispatchPlan {
                requires_credentials: true,
                honors_kv_setup: true,
            }),
            ProjectType::Unsupported(raw) => {
                Err(PublisherError::UnsupportedProjectType(raw.clone()))
            }
        }
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type-specific configuration steps that precede publishing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DispatchPlan {
    /// Write `webdev.env` with the AWS credential pair.
    pub requires_credentials: bool,
    /// Write `kv.js` when `SETUP_KV=true`.
    pub honors_kv_setup: bool,
}

/// What to do when the project directory already has content and
/// `FORCE_INIT` is unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExistingProjectPolicy {
    /// Keep the existing project and continue with configure/publish.
    #[default]
    Skip,
    /// Abort the run with [`PublisherError::AlreadyInitialized`].
    Fail,
}

impl FromStr for ExistingProjectPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "skip" => Ok(ExistingProjectPolicy::Skip),
            "fail" => Ok(ExistingProjectPolicy::Fail),
            other => Err(format!("expected skip or fail, got {other:?}")),
        }
    }
}

/// `SETUP_KV` and the descriptor fields it gates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KvSettings {
    pub enabled: Option<bool>,
    pub bucket: Option<String>,
    pub region: Option<String>,
    pub path: Option<String>,
}

/// AWS-style access key pair for nextjs/flareact builds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AwsCredentials {
    pub access_key_id: Option<Secret>,
    pub secret_access_key: Option<Secret>,
}

/// `SHOULD_COMMIT` and the push credentials it gates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitSettings {
    pub enabled: Option<bool>,
    pub user: Option<String>,
    pub token: Option<Secret>,
}

/// Upper bounds on blocking operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub download: Duration,
    pub command: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            download: Duration::from_secs(300),
            command: Duration::from_secs(600),
        }
    }
}

/// Immutable snapshot of every input for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfiguration {
    /// Process working directory; the vendor binary is placed here.
    pub working_dir: PathBuf,
    /// Repository checkout root (`GITHUB_WORKSPACE`).
    pub workspace: PathBuf,
    pub project_name: String,
    pub project_type: ProjectType,
    pub force_init: Option<bool>,
    pub kv: KvSettings,
    pub aws: AwsCredentials,
    pub commit: CommitSettings,
    pub publish_token: Secret,
    pub existing_project: ExistingProjectPolicy,
    pub timeouts: Timeouts,
}

impl RunConfiguration {
    /// Build the configuration from an environment snapshot.
    ///
    /// Fails on missing required variables and on malformed booleans.
    /// Variable combinations (credentials, KV fields, push credentials) are
    /// checked by the stage that needs them.
    pub fn from_env(env: &dyn EnvSource, working_dir: impl Into<PathBuf>) -> Result<Self> {
        let workspace = PathBuf::from(require(env, vars::GITHUB_WORKSPACE)?);
        let project_name = require(env, vars::PROJECT_NAME)?;
        let project_type = ProjectType::parse(&require(env, vars::PROJECT_TYPE)?);
        let publish_token = Secret::new(require(env, vars::AZION_TOKEN)?);

        let force_init = lookup_bool(env, vars::FORCE_INIT)?;

        let kv = KvSettings {
            enabled: lookup_bool(env, vars::SETUP_KV)?,
            bucket: env.lookup(vars::KV_BUCKET)?,
            region: env.lookup(vars::KV_REGION)?,
            path: env.lookup(vars::KV_PATH)?,
        };

        let aws = AwsCredentials {
            access_key_id: env.lookup(vars::AWS_ACCESS_KEY_ID)?.map(Secret::new),
            secret_access_key: env.lookup(vars::AWS_SECRET_ACCESS_KEY)?.map(Secret::new),
        };

        let commit = CommitSettings {
            enabled: lookup_bool(env, vars::SHOULD_COMMIT)?,
            user: env.lookup(vars::PUSH_USER)?,
            token: env.lookup(vars::PUSH_TOKEN)?.map(Secret::new),
        };

        Ok(Self {
            working_dir: working_dir.into(),
            workspace,
            project_name,
            project_type,
            force_init,
            kv,
            aws,
            commit,
            publish_token,
            existing_project: ExistingProjectPolicy::default(),
            timeouts: Timeouts::default(),
        })
    }

    pub fn with_existing_project_policy(mut self, policy: ExistingProjectPolicy) -> Self {
        self.existing_project = policy;
        self
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// `<workspace>/azion`
    pub fn project_dir(&self) -> PathBuf {
        self.workspace.join(PROJECT_DIR_NAME)
    }

    pub fn credentials_path(&self) -> PathBuf {
        self.project_dir().join(CREDENTIALS_FILE_NAME)
    }

    pub fn kv_descriptor_path(&self) -> PathBuf {
        self.project_dir().join(KV_DESCRIPTOR_FILE_NAME)
    }

    /// Where the vendor binary is downloaded to.
    pub fn binary_path(&self) -> PathBuf {
        self.working_dir.join(BINARY_NAME)
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }
}
