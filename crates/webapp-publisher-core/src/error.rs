//! Error taxonomy for the publish pipeline.

use std::path::{Path, PathBuf};

/// Errors produced by any pipeline stage.
///
/// Every stage returns these to the orchestrator unchanged; the first one
/// terminates the run.
#[derive(Debug, thiserror::Error)]
pub enum PublisherError {
    #[error("failed to download vendor binary from {url}: {reason}")]
    RemoteFetch { url: String, reason: String },

    #[error("io error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error(
        "you must provide {key_var} and {secret_var} environment variables for project type {project_type}"
    )]
    MissingCredentials {
        key_var: &'static str,
        secret_var: &'static str,
        project_type: String,
    },

    #[error("SETUP_KV is enabled but {} not set", .missing.join(", "))]
    MissingKvConfig { missing: Vec<&'static str> },

    #[error(
        "SHOULD_COMMIT is enabled but {} not set; a push user and token are required to commit changes",
        .missing.join(", ")
    )]
    MissingPushCredentials { missing: Vec<&'static str> },

    #[error("unsupported project type: {0:?} (expected javascript, nextjs or flareact)")]
    UnsupportedProjectType(String),

    #[error(
        "a project is already initialized at {}; delete it or set FORCE_INIT=true to initialize again",
        .path.display()
    )]
    AlreadyInitialized { path: PathBuf },

    #[error("vendor command `{command}` failed (exit code {}): {stderr}", display_code(.exit_code))]
    VendorCommand {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("cannot open git working copy at {}: {reason}", .path.display())]
    RepoOpen { path: PathBuf, reason: String },

    #[error("git command `{command}` failed: {stderr}")]
    Git { command: String, stderr: String },

    #[error("git push to {remote} failed: {stderr}")]
    Push { remote: String, stderr: String },

    #[error("{operation} timed out after {timeout_secs} seconds")]
    Timeout {
        operation: String,
        timeout_secs: u64,
    },
}

impl PublisherError {
    /// Wrap an I/O error with the path it concerns.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        PublisherError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

fn display_code(code: &Option<i32>) -> String {
    code.map(|c| c.to_string())
        .unwrap_or_else(|| "none".to_string())
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PublisherError>;
