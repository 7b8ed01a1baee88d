//! Mod records
//!
//! A [`Mod`] is built from the mod list, filled in by the registry lookup and
//! then handed to the downloader and installer.

pub mod manifest;
pub mod modlist;

pub use manifest::{LocalManifest, read_local_version};
pub use modlist::{ModListEntry, load_mod_list, parse_mod_list};

use std::path::PathBuf;

use crate::config::GamePaths;

/// A single mod tracked during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mod {
    /// Package name on the registry
    pub name: String,
    /// Package owner on the registry
    pub author: String,
    /// `{author}-{name}`, the key for every per-mod path
    pub folder_name: String,
    /// Version recorded in the installed manifest.json, if any
    pub local_version: Option<String>,
    /// Latest version published on the registry
    pub latest_version: Option<String>,
    pub download_url: Option<String>,
    /// Installed version equals the latest one
    pub is_up_to_date: bool,
}

impl Mod {
    pub fn new<N: Into<String>, A: Into<String>>(name: N, author: A) -> Self {
        let name = name.into();
        let author = author.into();
        let folder_name = format!("{}-{}", author, name);

        Self {
            name,
            author,
            folder_name,
            local_version: None,
            latest_version: None,
            download_url: None,
            is_up_to_date: false,
        }
    }

    /// Destination plugin folder of this mod
    pub fn plugin_folder(&self, paths: &GamePaths) -> PathBuf {
        paths.mod_folder(&self.folder_name)
    }

    /// Whether the registry lookup produced a download URL
    pub fn is_resolved(&self) -> bool {
        self.download_url.is_some() && self.latest_version.is_some()
    }

    /// Version for log lines, `?` when not yet known
    pub fn version_label(&self) -> &str {
        self.latest_version.as_deref().unwrap_or("?")
    }

    /// Record the installed version and compare it against the latest one
    pub fn set_local_version(&mut self, version: String) {
        self.is_up_to_date = self.latest_version.as_deref() == Some(version.as_str());
        self.local_version = Some(version);
    }
}

impl std::fmt::Display for Mod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} v{}", self.name, self.version_label())
    }
}
