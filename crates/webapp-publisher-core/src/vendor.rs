//! Canonical azioncli subcommands.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use crate::command::{CommandOutcome, CommandRunner, CommandSpec};
use crate::config::Secret;
use crate::error::{PublisherError, Result};
use crate::provision::ProvisionedBinary;

/// `azioncli webapp init`
pub const INIT_SUBCOMMAND: [&str; 2] = ["webapp", "init"];

/// `azioncli webapp publish`
pub const PUBLISH_SUBCOMMAND: [&str; 2] = ["webapp", "publish"];

/// `azioncli configure`
pub const CONFIGURE_SUBCOMMAND: &str = "configure";

/// Drives the provisioned vendor binary through a [`CommandRunner`].
///
/// All invocations run inside the workspace and share one timeout.
pub struct VendorCli<'a> {
    binary: PathBuf,
    runner: &'a dyn CommandRunner,
    workdir: PathBuf,
    timeout: Duration,
}

impl<'a> VendorCli<'a> {
    pub fn new(
        binary: &ProvisionedBinary,
        runner: &'a dyn CommandRunner,
        workdir: &Path,
        timeout: Duration,
    ) -> Self {
        Self {
            binary: binary.path.clone(),
            runner,
            workdir: workdir.to_path_buf(),
            timeout,
        }
    }

    fn command(&self) -> CommandSpec {
        CommandSpec::new(&self.binary)
            .current_dir(&self.workdir)
            .timeout(self.timeout)
    }

    /// `webapp init --name <name> --type <type> -y`
    pub async fn init(&self, name: &str, project_type: &str) -> Result<CommandOutcome> {
        let spec = self
            .command()
            .args(INIT_SUBCOMMAND)
            .args(["--name", name, "--type", project_type, "-y"]);
        self.run(spec).await
    }

    /// `configure -t <token>`
    pub async fn configure(&self, token: &Secret) -> Result<CommandOutcome> {
        let spec = self
            .command()
            .arg(CONFIGURE_SUBCOMMAND)
            .arg("-t")
            .secret_arg(token.expose());
        self.run(spec).await
    }

    /// `webapp publish`
    pub async fn publish(&self) -> Result<CommandOutcome> {
        let spec = self.command().args(PUBLISH_SUBCOMMAND);
        self.run(spec).await
    }

    async fn run(&self, spec: CommandSpec) -> Result<CommandOutcome> {
        debug!(command = %spec.display(), "Running vendor command");
        let outcome = self.runner.run(&spec).await?;
        if !outcome.success() {
            return Err(PublisherError::VendorCommand {
                command: spec.display(),
                exit_code: outcome.exit_code,
                stderr: outcome.stderr.trim().to_string(),
            });
        }
        Ok(outcome)
    }
}
