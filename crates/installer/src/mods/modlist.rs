//! YAML mod list loading

use serde::Deserialize;
use std::path::Path;

use super::Mod;
use crate::error::{FileOperation, ModError, Result};

/// One record of `mods.yml`
#[derive(Debug, Clone, Deserialize)]
pub struct ModListEntry {
    #[serde(rename = "displayName")]
    pub display_name: String,
    #[serde(rename = "authorName")]
    pub author_name: String,
}

impl From<ModListEntry> for Mod {
    fn from(entry: ModListEntry) -> Self {
        Mod::new(entry.display_name, entry.author_name)
    }
}

/// Parse mod list text, tolerating a UTF-8 byte-order mark
pub fn parse_mod_list(text: &str) -> std::result::Result<Vec<Mod>, serde_yaml::Error> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let entries: Vec<ModListEntry> = serde_yaml::from_str(text)?;
    Ok(entries.into_iter().map(Mod::from).collect())
}

/// Load the mod list from disk
pub async fn load_mod_list(path: &Path) -> Result<Vec<Mod>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ModError::fs(path, FileOperation::Read, e))?;

    parse_mod_list(&text).map_err(|source| ModError::ModList {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mod_list() {
        let text = "\u{feff}- displayName: LethalLib\n  authorName: Evaisa\n  enabled: true\n- displayName: MoreCompany\n  authorName: notnotnotswipez\n";
        let mods = parse_mod_list(text).unwrap();

        assert_eq!(mods.len(), 2);
        assert_eq!(mods[0].folder_name, "Evaisa-LethalLib");
        assert_eq!(mods[1].name, "MoreCompany");
        assert_eq!(mods[1].author, "notnotnotswipez");
    }

    #[test]
    fn test_empty_mod_list() {
        assert!(parse_mod_list("").unwrap().is_empty());
    }

    #[test]
    fn test_missing_author_is_rejected() {
        assert!(parse_mod_list("- displayName: LethalLib\n").is_err());
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let result = load_mod_list(Path::new("definitely/not/here/mods.yml")).await;
        assert!(matches!(result, Err(ModError::FileSystem { operation: FileOperation::Read, .. })));
    }
}
