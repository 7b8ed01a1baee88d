//! Configuration types for the mod manager

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::{FileOperation, ModError, Result};

/// Default package registry
pub const THUNDERSTORE_URL: &str = "https://thunderstore.io";

/// Game installation paths shared by the classifier, installer and registry client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GamePaths {
    /// Root of the game installation
    pub game_folder: PathBuf,
    /// `<game>/BepInEx`
    pub bepinex_folder: PathBuf,
    /// `<game>/BepInEx/plugins`
    pub plugins_folder: PathBuf,
    /// Scratch directory for archives and extracted trees
    pub temp_folder: PathBuf,
}

impl GamePaths {
    pub fn new<G: Into<PathBuf>, T: Into<PathBuf>>(game_folder: G, temp_folder: T) -> Self {
        let game_folder = game_folder.into();
        let bepinex_folder = game_folder.join("BepInEx");
        let plugins_folder = bepinex_folder.join("plugins");

        Self {
            game_folder,
            bepinex_folder,
            plugins_folder,
            temp_folder: temp_folder.into(),
        }
    }

    /// Dedicated plugin folder of a mod
    pub fn mod_folder(&self, folder_name: &str) -> PathBuf {
        self.plugins_folder.join(folder_name)
    }

    /// Directory a mod's archive is extracted into
    pub fn extract_folder(&self, folder_name: &str) -> PathBuf {
        self.temp_folder.join(folder_name)
    }

    /// Path of a mod's downloaded archive
    pub fn archive_path(&self, folder_name: &str) -> PathBuf {
        self.temp_folder.join(format!("{}.zip", folder_name))
    }

    /// Create the plugins and temp directories
    pub async fn prepare(&self) -> Result<()> {
        for dir in [&self.plugins_folder, &self.temp_folder] {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| ModError::fs(dir, FileOperation::CreateDir, e))?;
        }
        Ok(())
    }
}

/// Registry client settings
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Base URL of the package registry
    pub base_url: String,
    pub user_agent: String,
    /// Timeout for a single HTTP request
    pub timeout: Duration,
    /// Fixed delay between attempts on transient failures
    pub retry_delay: Duration,
    /// Upper bound on registry attempts per mod (first try included)
    pub max_attempts: usize,
}

impl RegistryConfig {
    /// Package endpoint for `author/name`
    pub fn package_url(&self, author: &str, name: &str) -> Result<Url> {
        let raw = format!(
            "{}/api/experimental/package/{}/{}/",
            self.base_url.trim_end_matches('/'),
            author,
            name
        );
        Url::parse(&raw).map_err(|source| ModError::InvalidUrl { url: raw, source })
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: THUNDERSTORE_URL.to_string(),
            user_agent: "lc-modmanager/0.1.0".to_string(),
            timeout: Duration::from_secs(60),
            retry_delay: Duration::from_secs(1),
            max_attempts: 30,
        }
    }
}

/// Configuration for a full check + install run
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    pub registry: RegistryConfig,
    /// Mods in flight at once, per phase
    pub max_concurrent: usize,
    /// Remove the temp folder once the run finishes
    pub clean_temp: bool,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            registry: RegistryConfig::default(),
            max_concurrent: 5,
            clean_temp: true,
        }
    }
}
