//! Installed `manifest.json` handling

use serde::Deserialize;
use std::path::Path;
use tokio::fs;

use crate::error::{FileOperation, ModError, Result};

pub const MANIFEST_FILE: &str = "manifest.json";

/// The part of a Thunderstore manifest we care about
#[derive(Debug, Clone, Deserialize)]
pub struct LocalManifest {
    pub version_number: String,
}

impl LocalManifest {
    /// Parse manifest text, tolerating a UTF-8 byte-order mark
    pub fn parse(text: &str) -> std::result::Result<Self, serde_json::Error> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        serde_json::from_str(text)
    }
}

/// Read the installed version from `<plugin_folder>/manifest.json`
///
/// Returns `Ok(None)` when the mod is not installed.
pub async fn read_local_version(plugin_folder: &Path) -> Result<Option<String>> {
    let path = plugin_folder.join(MANIFEST_FILE);
    if !fs::try_exists(&path).await.unwrap_or(false) {
        return Ok(None);
    }

    let text = fs::read_to_string(&path)
        .await
        .map_err(|e| ModError::fs(&path, FileOperation::Read, e))?;
    let manifest = LocalManifest::parse(&text)
        .map_err(|source| ModError::MalformedManifest { path: path.clone(), source })?;

    Ok(Some(manifest.version_number))
}
