//! HTTP downloads of release assets and checksum manifests

use crate::error::{Error, Result};
use binstall_core::RunConfig;
use futures_util::StreamExt;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Build the HTTP client shared by the resolver and the downloader
pub fn build_client(config: &RunConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(config.user_agent())
        .timeout(config.http_timeout())
        .build()
        .map_err(|e| {
            Error::network(
                config.github_api_url(),
                format!("Failed to create HTTP client: {}", e),
            )
        })
}

/// Streams remote files to disk
#[derive(Debug, Clone)]
pub struct Downloader {
    client: reqwest::Client,
}

impl Downloader {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::network(url, e))?;

        if !response.status().is_success() {
            return Err(Error::network(
                url,
                format!("Download failed with status: {}", response.status()),
            ));
        }
        Ok(response)
    }

    /// Download `url` into `dest`, returning the number of bytes written
    pub async fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        debug!("Downloading {} to {}", url, dest.display());

        let response = self.get(url).await?;
        let mut file = fs::File::create(dest)
            .await
            .map_err(|e| Error::io_at("create", dest, e))?;

        let mut written = 0u64;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk: bytes::Bytes = chunk.map_err(|e| Error::network(url, e))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| Error::io_at("write", dest, e))?;
            written += chunk.len() as u64;
        }
        file.flush()
            .await
            .map_err(|e| Error::io_at("write", dest, e))?;

        debug!("Downloaded {} bytes from {}", written, url);
        Ok(written)
    }

    /// Fetch a small text document such as a checksum manifest
    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        self.get(url)
            .await?
            .text()
            .await
            .map_err(|e| Error::network(url, e))
    }
}

/// Recreate `folder` empty
pub async fn prepare_download_folder(folder: &Path) -> Result<()> {
    match fs::remove_dir_all(folder).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(Error::io_at("remove", folder, e)),
    }
    fs::create_dir_all(folder)
        .await
        .map_err(|e| Error::io_at("create", folder, e))
}
