//! Authenticate the vendor CLI and publish the project.

use tracing::info;

use crate::command::CommandOutcome;
use crate::config::RunConfiguration;
use crate::error::Result;
use crate::vendor::VendorCli;

/// Run `configure -t <token>` followed by `webapp publish`.
///
/// Stdout of the publish step is logged and returned for reporting only.
pub async fn publish(vendor: &VendorCli<'_>, config: &RunConfiguration) -> Result<CommandOutcome> {
    vendor.configure(&config.publish_token).await?;
    info!("Vendor CLI configured");

    let outcome = vendor.publish().await?;
    info!(
        project = %config.project_name,
        duration_ms = outcome.duration_ms,
        "Publish finished"
    );
    info!("Result: {}", outcome.stdout.trim());
    Ok(outcome)
}
