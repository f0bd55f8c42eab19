//! Type-specific configuration files written before publishing.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{DispatchPlan, KvSettings, RunConfiguration};
use crate::env::vars;
use crate::error::{PublisherError, Result};

/// Key-value store binding consumed by the published application.
///
/// Field order is the serialized key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KvDescriptor {
    pub bucket: String,
    pub region: String,
    pub path: String,
}

impl KvDescriptor {
    /// Build the descriptor from the `SETUP_KV` group without touching the
    /// filesystem. `Ok(None)` when `SETUP_KV` is unset or `false`.
    pub fn from_settings(kv: &KvSettings) -> Result<Option<Self>> {
        if kv.enabled != Some(true) {
            return Ok(None);
        }

        let (Some(bucket), Some(region), Some(path)) = (&kv.bucket, &kv.region, &kv.path) else {
            let missing = [
                (vars::KV_BUCKET, kv.bucket.is_none()),
                (vars::KV_REGION, kv.region.is_none()),
                (vars::KV_PATH, kv.path.is_none()),
            ]
            .into_iter()
            .filter_map(|(name, absent)| absent.then_some(name))
            .collect();
            return Err(PublisherError::MissingKvConfig { missing });
        };

        Ok(Some(Self {
            bucket: bucket.clone(),
            region: region.clone(),
            path: path.clone(),
        }))
    }
}

/// Files written by [`configure_project`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfiguredFiles {
    pub credentials_file: PathBuf,
    pub kv_descriptor: Option<PathBuf>,
}

/// Write the credentials file and, when `plan` honors `SETUP_KV`, the KV
/// descriptor.
///
/// All inputs are checked first, so a missing credential or KV field leaves
/// the project directory untouched.
pub fn configure_project(config: &RunConfiguration, plan: &DispatchPlan) -> Result<ConfiguredFiles> {
    let contents = credentials_contents(config)?;
    let kv = if plan.honors_kv_setup {
        KvDescriptor::from_settings(&config.kv)?
    } else {
        None
    };

    let credentials_file = write_credentials(config, &contents)?;
    let kv_descriptor = kv.map(|d| write_descriptor(config, &d)).transpose()?;
    Ok(ConfiguredFiles {
        credentials_file,
        kv_descriptor,
    })
}

fn credentials_contents(config: &RunConfiguration) -> Result<String> {
    let (Some(key), Some(secret)) = (&config.aws.access_key_id, &config.aws.secret_access_key)
    else {
        return Err(PublisherError::MissingCredentials {
            key_var: vars::AWS_ACCESS_KEY_ID,
            secret_var: vars::AWS_SECRET_ACCESS_KEY,
            project_type: config.project_type.to_string(),
        });
    };

    Ok(format!(
        "{}={}\n{}={}",
        vars::AWS_ACCESS_KEY_ID,
        key.expose(),
        vars::AWS_SECRET_ACCESS_KEY,
        secret.expose()
    ))
}

fn write_credentials(config: &RunConfiguration, contents: &str) -> Result<PathBuf> {
    let path = config.credentials_path();
    write_file(&path, contents.as_bytes())?;
    info!(path = %path.display(), "Wrote credentials file");
    Ok(path)
}

fn write_descriptor(config: &RunConfiguration, descriptor: &KvDescriptor) -> Result<PathBuf> {
    let body = serde_json::to_string_pretty(descriptor)
        .map_err(|e| PublisherError::Configuration(format!("cannot encode KV descriptor: {e}")))?;

    let target = config.kv_descriptor_path();
    write_file(&target, body.as_bytes())?;
    info!(path = %target.display(), bucket = %descriptor.bucket, "Wrote KV descriptor");
    Ok(target)
}

/// Write `AWS_ACCESS_KEY_ID`/`AWS_SECRET_ACCESS_KEY` to `azion/webdev.env`.
pub fn write_credentials_file(config: &RunConfiguration) -> Result<PathBuf> {
    let contents = credentials_contents(config)?;
    write_credentials(config, &contents)
}

/// Write `azion/kv.js` when `SETUP_KV=true`.
///
/// Returns `Ok(None)` without touching the filesystem when `SETUP_KV` is
/// unset or `false`. When enabled, bucket, region and path must all be set;
/// otherwise nothing is written.
pub fn write_kv_descriptor(config: &RunConfiguration) -> Result<Option<PathBuf>> {
    match KvDescriptor::from_settings(&config.kv)? {
        Some(descriptor) => write_descriptor(config, &descriptor).map(Some),
        None => {
            debug!("SETUP_KV not enabled, skipping KV descriptor");
            Ok(None)
        }
    }
}

fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| PublisherError::io(parent, e))?;
    }
    std::fs::write(path, contents).map_err(|e| PublisherError::io(path, e))
}
