//! Image downloads into the local image directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::debug;

use crate::constants::USER_AGENT;
use crate::markdown::ImageReference;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("request for {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned status {status}")]
    Status { url: String, status: StatusCode },
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Fetches image references and stores them under their local name.
///
/// Cheap to clone; clones share the HTTP connection pool.
#[derive(Debug, Clone)]
pub struct ImageDownloader {
    client: Client,
    dir: PathBuf,
}

impl ImageDownloader {
    /// Create a downloader writing into `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(dir: impl Into<PathBuf>, timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self::with_client(client, dir))
    }

    #[must_use]
    pub fn with_client(client: Client, dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            dir: dir.into(),
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Download one image, overwriting any file of the same name.
    ///
    /// Returns the path written.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success status, or a
    /// failed write. Nothing is retried.
    pub async fn fetch(&self, image: &ImageReference) -> Result<PathBuf, DownloadError> {
        let url = &image.source_url;
        let request_error = |source| DownloadError::Request {
            url: url.clone(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status {
                url: url.clone(),
                status,
            });
        }

        let bytes = response.bytes().await.map_err(request_error)?;
        let path = self.dir.join(&image.local_name);
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|source| DownloadError::Write {
                path: path.clone(),
                source,
            })?;

        debug!(url = %url, path = %path.display(), bytes = bytes.len(), "Downloaded image");
        Ok(path)
    }
}
