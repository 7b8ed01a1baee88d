//! Filesystem helpers shared by the classifier and the layout handlers
//!
//! Everything here is blocking; callers run it on the blocking pool.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::FileOperation;
use crate::install::error::InstallError;

/// Top-level entries of a directory, split into file and directory names
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DirListing {
    pub files: Vec<String>,
    pub dirs: Vec<String>,
}

/// List a directory's immediate children, sorted by name
pub fn list_dir(dir: &Path) -> Result<DirListing, InstallError> {
    let mut listing = DirListing::default();
    let entries = fs::read_dir(dir).map_err(|e| InstallError::fs(dir, FileOperation::ListDir, e))?;

    for entry in entries {
        let entry = entry.map_err(|e| InstallError::fs(dir, FileOperation::ListDir, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if entry.path().is_dir() {
            listing.dirs.push(name);
        } else {
            listing.files.push(name);
        }
    }

    listing.files.sort();
    listing.dirs.sort();
    Ok(listing)
}

/// Find an entry of `names` equal to `wanted`, ignoring ASCII case
pub fn find_ci<'a>(names: &'a [String], wanted: &str) -> Option<&'a str> {
    names
        .iter()
        .find(|name| name.eq_ignore_ascii_case(wanted))
        .map(String::as_str)
}

/// Copy the tree under `src` into `dest`, keeping existing files and
/// overwriting on name clash. Returns the number of files copied.
pub fn merge_dir(src: &Path, dest: &Path) -> Result<u64, InstallError> {
    fs::create_dir_all(dest).map_err(|e| InstallError::fs(dest, FileOperation::CreateDir, e))?;

    let mut copied = 0;
    for entry in WalkDir::new(src).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|source| InstallError::Walk {
            path: src.to_path_buf(),
            source,
        })?;
        let Ok(relative) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| InstallError::fs(&target, FileOperation::CreateDir, e))?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| InstallError::fs(parent, FileOperation::CreateDir, e))?;
            }
            fs::copy(entry.path(), &target).map_err(|e| InstallError::fs(&target, FileOperation::Copy, e))?;
            copied += 1;
        }
    }

    debug!("Merged {} files from {} into {}", copied, src.display(), dest.display());
    Ok(copied)
}

/// Move a file into `dest_dir`, replacing any file of the same name
pub fn move_into(src: &Path, dest_dir: &Path) -> Result<(), InstallError> {
    let file_name = src
        .file_name()
        .ok_or_else(|| InstallError::fs(src, FileOperation::Move, ErrorKind::InvalidInput.into()))?;
    let target = dest_dir.join(file_name);

    fs::create_dir_all(dest_dir).map_err(|e| InstallError::fs(dest_dir, FileOperation::CreateDir, e))?;
    if target.is_file() {
        fs::remove_file(&target).map_err(|e| InstallError::fs(&target, FileOperation::Delete, e))?;
    }

    // rename fails across filesystems (temp dir on another drive)
    if fs::rename(src, &target).is_err() {
        fs::copy(src, &target).map_err(|e| InstallError::fs(&target, FileOperation::Copy, e))?;
        fs::remove_file(src).map_err(|e| InstallError::fs(src, FileOperation::Delete, e))?;
    }

    debug!("Moved {} to {}", src.display(), target.display());
    Ok(())
}

/// Remove a directory tree; a missing directory is not an error
pub fn remove_dir(dir: &Path) -> Result<(), InstallError> {
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(InstallError::fs(dir, FileOperation::Delete, e)),
    }
}
