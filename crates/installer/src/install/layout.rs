//! Archive layout classification
//!
//! Registry packages follow no single convention. An extracted archive is
//! matched against the known layouts in priority order:
//!
//! 1. a `BepInEx` folder at the root (`bepinex`)
//! 2. loader subfolders such as `plugins` or `config` at the root (`subfolder`)
//! 3. loose `.dll` / `.cosmetics` files at the root (`dll`)
//! 4. any of the above one directory down (`other/bepinex`, `other/subfolder`, `other/dll`)

use std::path::{Path, PathBuf};

use crate::config::GamePaths;
use crate::install::error::InstallError;
use crate::install::fs_ops::{self, DirListing};

/// Files that describe a package rather than being part of its payload
pub const METADATA_FILES: [&str; 5] = ["manifest.json", "readme.md", "changelog.md", "license", "icon.png"];

/// Folder names that identify a `subfolder` layout
pub const RECOGNIZED_SUBFOLDERS: [&str; 4] = ["plugins", "config", "core", "patchers"];

/// Loose payload extensions that identify a `dll` layout
const PAYLOAD_EXTENSIONS: [&str; 2] = [".dll", ".cosmetics"];

pub fn is_metadata_file(name: &str) -> bool {
    METADATA_FILES.iter().any(|m| name.eq_ignore_ascii_case(m))
}

pub fn is_recognized_subfolder(name: &str) -> bool {
    RECOGNIZED_SUBFOLDERS.iter().any(|s| name.eq_ignore_ascii_case(s))
}

fn is_payload_file(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    PAYLOAD_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Packaging convention of an archive, with what the installer needs to apply it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    /// Archive ships a loader-rooted `BepInEx/` tree
    BepInEx {
        root: PathBuf,
        /// The `BepInEx` directory as spelled in the archive
        bepinex_dir: PathBuf,
        /// Non-metadata files next to `BepInEx/`, relocated to the game root
        root_files: Vec<String>,
    },
    /// Archive ships loader subfolders (`plugins`, `config`, ...) at its root
    Subfolder {
        root: PathBuf,
        /// Every directory at the root, merged into the game's `BepInEx/`
        subfolders: Vec<String>,
    },
    /// Archive is a bare drop of plugin files
    Dll { root: PathBuf },
}

impl Layout {
    /// Directory the installer computes relative copies from
    pub fn root_path(&self) -> &Path {
        match self {
            Layout::BepInEx { root, .. } | Layout::Subfolder { root, .. } | Layout::Dll { root } => root,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Layout::BepInEx { .. } => "bepinex",
            Layout::Subfolder { .. } => "subfolder",
            Layout::Dll { .. } => "dll",
        }
    }
}

/// Result of classifying one extracted archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub layout: Layout,
    /// Wrapper directory the layout was found in, for `other/*` tags
    pub wrapper: Option<String>,
    /// Destination root the payload is merged into
    pub extraction_path: PathBuf,
    /// Metadata files at the top of the archive, routed to the plugin folder
    pub metadata_files: Vec<PathBuf>,
}

impl Classification {
    /// `bepinex`, `other/dll`, ...
    pub fn tag(&self) -> String {
        match self.wrapper {
            Some(_) => format!("other/{}", self.layout.kind()),
            None => self.layout.kind().to_string(),
        }
    }

    pub fn root_path(&self) -> &Path {
        self.layout.root_path()
    }
}

/// Classify the extracted archive at `extracted_root` for the mod `folder_name`
pub fn classify(
    extracted_root: &Path,
    paths: &GamePaths,
    folder_name: &str,
) -> Result<Classification, InstallError> {
    if !extracted_root.is_dir() {
        return Err(InstallError::MissingArchive(extracted_root.to_path_buf()));
    }

    let listing = fs_ops::list_dir(extracted_root)?;
    let metadata_files = listing
        .files
        .iter()
        .filter(|name| is_metadata_file(name))
        .map(|name| extracted_root.join(name))
        .collect();

    let mod_folder = paths.mod_folder(folder_name);

    if let Some((layout, extraction_path)) = match_candidate(extracted_root, &listing, paths, &mod_folder)? {
        return Ok(Classification {
            layout,
            wrapper: None,
            extraction_path,
            metadata_files,
        });
    }

    for dir in &listing.dirs {
        let candidate = extracted_root.join(dir);
        let nested = fs_ops::list_dir(&candidate)?;

        if let Some((layout, extraction_path)) = match_candidate(&candidate, &nested, paths, &mod_folder)? {
            return Ok(Classification {
                layout,
                wrapper: Some(dir.clone()),
                extraction_path,
                metadata_files,
            });
        }
    }

    Err(InstallError::Unclassified {
        root: extracted_root.to_path_buf(),
    })
}

/// Apply the three root-level rules to one candidate directory
fn match_candidate(
    candidate: &Path,
    listing: &DirListing,
    paths: &GamePaths,
    mod_folder: &Path,
) -> Result<Option<(Layout, PathBuf)>, InstallError> {
    if let Some(bepinex) = fs_ops::find_ci(&listing.dirs, "BepInEx") {
        let bepinex_dir = candidate.join(bepinex);
        let root_files = listing
            .files
            .iter()
            .filter(|name| !is_metadata_file(name))
            .cloned()
            .collect();

        let layout = Layout::BepInEx {
            root: candidate.to_path_buf(),
            bepinex_dir,
            root_files,
        };
        return Ok(Some((layout, paths.game_folder.clone())));
    }

    if listing.dirs.iter().any(|dir| is_recognized_subfolder(dir)) {
        let layout = Layout::Subfolder {
            root: candidate.to_path_buf(),
            subfolders: listing.dirs.clone(),
        };
        return Ok(Some((layout, paths.bepinex_folder.clone())));
    }

    if listing.files.iter().any(|name| is_payload_file(name)) {
        let layout = Layout::Dll {
            root: candidate.to_path_buf(),
        };
        return Ok(Some((layout, mod_folder.to_path_buf())));
    }

    Ok(None)
}
