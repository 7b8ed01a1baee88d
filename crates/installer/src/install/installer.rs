//! Layout-specific installation routines
//!
//! Every copy goes through [`fs_ops::merge_dir`], so installing the same
//! archive twice leaves the game folder as installing it once would.

use std::path::Path;
use tracing::{debug, info_span};

use crate::config::GamePaths;
use crate::error::FileOperation;
use crate::install::error::InstallError;
use crate::install::fs_ops;
use crate::install::layout::{Classification, Layout, classify, is_recognized_subfolder};

/// Installs classified archives into a game folder
#[derive(Debug, Clone)]
pub struct ModInstaller {
    paths: GamePaths,
}

impl ModInstaller {
    pub fn new(paths: GamePaths) -> Self {
        Self { paths }
    }

    /// Classify the archive extracted at `extracted_root` and install it
    ///
    /// Classification runs before anything is written, so an archive that
    /// matches no layout leaves the game folder untouched.
    pub fn install(&self, folder_name: &str, extracted_root: &Path) -> Result<Classification, InstallError> {
        let _span = info_span!("install", mod_folder = folder_name).entered();

        let classification = classify(extracted_root, &self.paths, folder_name)?;
        debug!(
            "Classified {} as {} (root: {})",
            folder_name,
            classification.tag(),
            classification.root_path().display()
        );

        self.apply(folder_name, &classification)?;
        Ok(classification)
    }

    /// Relocate metadata files, then run the layout handler
    pub fn apply(&self, folder_name: &str, classification: &Classification) -> Result<(), InstallError> {
        let mod_folder = self.paths.mod_folder(folder_name);
        std::fs::create_dir_all(&mod_folder).map_err(|e| InstallError::fs(&mod_folder, FileOperation::CreateDir, e))?;

        for metadata in &classification.metadata_files {
            fs_ops::move_into(metadata, &mod_folder)?;
        }

        match &classification.layout {
            Layout::BepInEx { root, bepinex_dir, root_files, .. } => {
                self.handle_bepinex(folder_name, root, bepinex_dir, root_files, &classification.extraction_path)
            }
            Layout::Subfolder { root, subfolders } => {
                self.handle_subfolder(folder_name, root, subfolders, &classification.extraction_path)
            }
            Layout::Dll { root } => self.handle_dll(folder_name, root, &classification.extraction_path),
        }
    }

    fn handle_bepinex(
        &self,
        folder_name: &str,
        root: &Path,
        bepinex_dir: &Path,
        root_files: &[String],
        extraction_path: &Path,
    ) -> Result<(), InstallError> {
        self.redistribute_plugins(bepinex_dir, folder_name)?;

        for file in root_files {
            if file.to_ascii_lowercase().ends_with(".txt") {
                continue;
            }
            let source = root.join(file);
            if source.is_file() {
                fs_ops::move_into(&source, &self.paths.game_folder)?;
            }
        }

        fs_ops::merge_dir(bepinex_dir, &extraction_path.join("BepInEx"))?;
        Ok(())
    }

    fn handle_subfolder(
        &self,
        folder_name: &str,
        root: &Path,
        subfolders: &[String],
        extraction_path: &Path,
    ) -> Result<(), InstallError> {
        self.redistribute_plugins(root, folder_name)?;

        for subfolder in subfolders {
            let source = root.join(subfolder);
            if !source.is_dir() {
                continue;
            }
            // `Config/` and `config/` must land in the same place on case-sensitive filesystems
            let target_name = if is_recognized_subfolder(subfolder) {
                subfolder.to_ascii_lowercase()
            } else {
                subfolder.clone()
            };
            fs_ops::merge_dir(&source, &extraction_path.join(target_name))?;
        }
        Ok(())
    }

    /// The whole root lands as `<plugin folder>/<folder_name>/`
    fn handle_dll(&self, folder_name: &str, root: &Path, extraction_path: &Path) -> Result<(), InstallError> {
        fs_ops::merge_dir(root, &extraction_path.join(folder_name))?;
        Ok(())
    }

    /// Route `<parent>/plugins` into the plugin folders, then drop it
    ///
    /// Loose files belong to this mod. A subfolder named after this mod is
    /// its own output and is merged straight into the plugin folder; any other
    /// subfolder is a bundled mod's output and is kept inside this mod's folder.
    fn redistribute_plugins(&self, parent: &Path, folder_name: &str) -> Result<(), InstallError> {
        let listing = fs_ops::list_dir(parent)?;
        let Some(plugins_name) = fs_ops::find_ci(&listing.dirs, "plugins") else {
            return Ok(());
        };
        let plugins = parent.join(plugins_name);
        let mod_folder = self.paths.mod_folder(folder_name);
        let contents = fs_ops::list_dir(&plugins)?;

        for file in &contents.files {
            fs_ops::move_into(&plugins.join(file), &mod_folder)?;
        }

        for dir in &contents.dirs {
            let target = if dir == folder_name {
                mod_folder.clone()
            } else {
                mod_folder.join(dir)
            };
            fs_ops::merge_dir(&plugins.join(dir), &target)?;
        }

        fs_ops::remove_dir(&plugins)
    }
}
