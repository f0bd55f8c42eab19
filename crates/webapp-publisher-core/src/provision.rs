//! Vendor binary retrieval.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::{PublisherError, Result};

/// Fixed download location of the vendor CLI.
pub const DEFAULT_DOWNLOAD_URL: &str = "https://downloads.azion.com/linux/x86_64/azioncli";

/// A vendor executable present on the local filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisionedBinary {
    pub path: PathBuf,
    pub size_bytes: u64,
    /// SHA-256 of the file contents, lowercase hex.
    pub sha256: String,
}

impl ProvisionedBinary {
    /// Mark `path` executable and record its identity.
    pub async fn finalize(path: &Path) -> Result<Self> {
        set_executable(path).await?;

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| PublisherError::io(path, e))?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);

        Ok(Self {
            path: path.to_path_buf(),
            size_bytes: bytes.len() as u64,
            sha256: hex::encode(hasher.finalize()),
        })
    }
}

#[cfg(unix)]
async fn set_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .await
        .map_err(|e| PublisherError::io(path, e))
}

#[cfg(not(unix))]
async fn set_executable(_path: &Path) -> Result<()> {
    Ok(())
}

/// Something that can place the vendor binary at a destination path.
#[async_trait]
pub trait BinarySource: Send + Sync {
    /// Any error means the binary at `destination` is unusable, even if a
    /// partial file was left behind.
    async fn provision(&self, destination: &Path) -> Result<ProvisionedBinary>;
}

/// Downloads the binary over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpProvisioner {
    url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl HttpProvisioner {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let url = url.into();
        let client = reqwest::Client::builder()
            .user_agent(concat!("webapp-publisher/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PublisherError::RemoteFetch {
                url: url.clone(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            url,
            timeout,
            client,
        })
    }

    async fn download(&self, destination: &Path) -> Result<u64> {
        let mut file = tokio::fs::File::create(destination)
            .await
            .map_err(|e| PublisherError::io(destination, e))?;

        let mut response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.fetch_error(e))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(PublisherError::RemoteFetch {
                url: self.url.clone(),
                reason: format!("bad status: {status}"),
            });
        }

        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await.map_err(|e| self.fetch_error(e))? {
            file.write_all(&chunk)
                .await
                .map_err(|e| PublisherError::io(destination, e))?;
            written += chunk.len() as u64;
        }
        file.flush()
            .await
            .map_err(|e| PublisherError::io(destination, e))?;

        Ok(written)
    }

    fn fetch_error(&self, err: reqwest::Error) -> PublisherError {
        PublisherError::RemoteFetch {
            url: self.url.clone(),
            reason: err.to_string(),
        }
    }
}

#[async_trait]
impl BinarySource for HttpProvisioner {
    async fn provision(&self, destination: &Path) -> Result<ProvisionedBinary> {
        info!(url = %self.url, destination = %destination.display(), "Downloading vendor binary");

        let written = tokio::time::timeout(self.timeout, self.download(destination))
            .await
            .map_err(|_| PublisherError::Timeout {
                operation: format!("download of {}", self.url),
                timeout_secs: self.timeout.as_secs(),
            })??;
        debug!(bytes = written, "Download complete");

        let binary = ProvisionedBinary::finalize(destination).await?;
        info!(sha256 = %binary.sha256, size_bytes = binary.size_bytes, "Vendor binary ready");
        Ok(binary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_finalize_sets_mode_and_digest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("azioncli");
        std::fs::write(&path, b"#!/bin/sh\nexit 0\n").unwrap();

        let binary = ProvisionedBinary::finalize(&path).await.unwrap();
        assert_eq!(binary.size_bytes, 17);
        assert_eq!(binary.sha256.len(), 64);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }
    }

    #[tokio::test]
    async fn test_finalize_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ProvisionedBinary::finalize(&dir.path().join("absent"))
            .await
            .unwrap_err();
        assert!(matches!(err, PublisherError::Io { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_remote_fetch_error() {
        let dir = tempfile::tempdir().unwrap();
        // Port 9 on loopback (discard) is almost never listening.
        let provisioner =
            HttpProvisioner::new("http://127.0.0.1:9/azioncli", Duration::from_secs(10)).unwrap();
        let err = provisioner
            .provision(&dir.path().join("azioncli"))
            .await
            .unwrap_err();
        assert!(matches!(err, PublisherError::RemoteFetch { .. }), "{err:?}");
    }
}
