//! Project initialization decision and `webapp init`.

use std::path::Path;

use tracing::info;

use crate::command::CommandOutcome;
use crate::config::{ExistingProjectPolicy, RunConfiguration};
use crate::error::{PublisherError, Result};
use crate::probe::DirectoryState;
use crate::vendor::VendorCli;

/// Decide whether `webapp init` must run.
///
/// An explicit `FORCE_INIT` wins over the directory state in both
/// directions: `true` re-initializes over an existing project, `false`
/// never initializes, even when the directory is missing.
pub fn should_initialize(
    state: DirectoryState,
    force: Option<bool>,
    policy: ExistingProjectPolicy,
    project_dir: &Path,
) -> Result<bool> {
    if let Some(force) = force {
        return Ok(force);
    }

    match (state, policy) {
        (DirectoryState::Missing | DirectoryState::Empty, _) => Ok(true),
        (DirectoryState::NonEmpty, ExistingProjectPolicy::Skip) => Ok(false),
        (DirectoryState::NonEmpty, ExistingProjectPolicy::Fail) => {
            Err(PublisherError::AlreadyInitialized {
                path: project_dir.to_path_buf(),
            })
        }
    }
}

/// Run `webapp init` for the configured project.
pub async fn initialize(vendor: &VendorCli<'_>, config: &RunConfiguration) -> Result<CommandOutcome> {
    info!(
        project = %config.project_name,
        project_type = %config.project_type,
        "Initializing project"
    );
    let outcome = vendor
        .init(&config.project_name, config.project_type.as_str())
        .await?;
    info!(stdout = %outcome.stdout.trim(), "Project initialized");
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATES: [DirectoryState; 3] = [
        DirectoryState::Empty,
        DirectoryState::NonEmpty,
        DirectoryState::Missing,
    ];
    const ALL_POLICIES: [ExistingProjectPolicy; 2] =
        [ExistingProjectPolicy::Skip, ExistingProjectPolicy::Fail];

    fn dir() -> &'static Path {
        Path::new("/ws/azion")
    }

    #[test]
    fn test_force_true_always_initializes() {
        for state in ALL_STATES {
            for policy in ALL_POLICIES {
                assert!(should_initialize(state, Some(true), policy, dir()).unwrap());
            }
        }
    }

    #[test]
    fn test_force_false_never_initializes() {
        for state in ALL_STATES {
            for policy in ALL_POLICIES {
                assert!(!should_initialize(state, Some(false), policy, dir()).unwrap());
            }
        }
    }

    #[test]
    fn test_missing_or_empty_initializes_without_force() {
        for state in [DirectoryState::Missing, DirectoryState::Empty] {
            for policy in ALL_POLICIES {
                assert!(should_initialize(state, None, policy, dir()).unwrap());
            }
        }
    }

    #[test]
    fn test_non_empty_skip_policy() {
        let should = should_initialize(
            DirectoryState::NonEmpty,
            None,
            ExistingProjectPolicy::Skip,
            dir(),
        )
        .unwrap();
        assert!(!should);
    }

    #[test]
    fn test_non_empty_fail_policy() {
        let err = should_initialize(
            DirectoryState::NonEmpty,
            None,
            ExistingProjectPolicy::Fail,
            dir(),
        )
        .unwrap_err();
        assert!(matches!(err, PublisherError::AlreadyInitialized { ref path } if path == dir()));
        assert!(err.to_string().contains("FORCE_INIT"));
    }
}
