//! Package registry client
//!
//! Looks packages up on the registry and decides whether the installed copy
//! of a mod is current. Transient failures are retried with a fixed delay up
//! to [`RegistryConfig::max_attempts`].

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tokio_retry::RetryIf;
use tokio_retry::strategy::FixedInterval;
use tracing::{debug, warn};
use url::Url;

use crate::config::{GamePaths, RegistryConfig};
use crate::error::{ModError, Result, error_chain};
use crate::mods::{Mod, read_local_version};

/// `GET /api/experimental/package/{author}/{name}/` response
#[derive(Debug, Clone, Deserialize)]
struct PackageListing {
    latest: PackageVersion,
}

/// Latest published version of a package
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PackageVersion {
    pub download_url: String,
    pub version_number: String,
}

/// HTTP client for the package registry
#[derive(Debug, Clone)]
pub struct RegistryClient {
    client: Client,
    config: RegistryConfig,
}

impl RegistryClient {
    pub fn new(config: RegistryConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| ModError::Configuration {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client, config })
    }

    /// Underlying HTTP client, shared with the archive downloader
    pub fn http(&self) -> &Client {
        &self.client
    }

    /// Look up the latest version of `author/name`, retrying transient failures
    pub async fn fetch_package(&self, author: &str, name: &str) -> Result<PackageVersion> {
        let url = self.config.package_url(author, name)?;
        let url_ref = &url;
        let retries = self.config.max_attempts.saturating_sub(1);
        let strategy = FixedInterval::new(self.config.retry_delay).take(retries);

        let result = RetryIf::start(
            strategy,
            move || async move {
                let attempt = self.request_package(url_ref).await;
                if let Err(e) = &attempt {
                    if e.is_recoverable() {
                        warn!("Registry lookup for {}/{} failed, retrying: {}", author, name, error_chain(e));
                    }
                }
                attempt
            },
            |e: &ModError| e.is_recoverable(),
        )
        .await;

        result.map_err(|e| {
            if e.is_recoverable() {
                ModError::RetriesExhausted {
                    url: url.to_string(),
                    attempts: retries + 1,
                    last_error: error_chain(&e),
                }
            } else {
                e
            }
        })
    }

    /// One registry request, no retries
    async fn request_package(&self, url: &Url) -> Result<PackageVersion> {
        debug!("Querying registry: {}", url);
        let response = self.client.get(url.clone()).send().await?;

        if response.status() != StatusCode::OK {
            return Err(ModError::UnexpectedStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let body = response.bytes().await?;
        let listing: PackageListing = serde_json::from_slice(&body).map_err(|source| ModError::MalformedResponse {
            url: url.to_string(),
            source,
        })?;

        Ok(listing.latest)
    }

    /// Resolve a mod against the registry and compare with the installed copy
    ///
    /// Sets the latest version and download URL; marks the mod up to date when
    /// its installed manifest carries the same version string.
    pub async fn fetch_info(&self, m: &mut Mod, paths: &GamePaths) -> Result<()> {
        let package = self.fetch_package(&m.author, &m.name).await?;
        m.latest_version = Some(package.version_number);
        m.download_url = Some(package.download_url);

        match read_local_version(&m.plugin_folder(paths)).await {
            Ok(Some(version)) => {
                debug!("{} installed at v{}", m.folder_name, version);
                m.set_local_version(version);
            }
            Ok(None) => {}
            Err(e) => {
                warn!("Ignoring installed copy of {}: {}", m.folder_name, error_chain(&e));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
