//! Installation error types

use std::path::PathBuf;
use thiserror::Error;

use crate::error::FileOperation;

/// Errors that can occur during classification and installation
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("Installer didn't return any valid structure for '{}'", root.display())]
    Unclassified { root: PathBuf },

    #[error("Extracted archive not found at '{}'", .0.display())]
    MissingArchive(PathBuf),

    #[error("File operation failed on '{}' while {operation}", path.display())]
    FileSystem {
        path: PathBuf,
        operation: FileOperation,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to walk '{}'", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

impl InstallError {
    pub(crate) fn fs(path: impl Into<PathBuf>, operation: FileOperation, source: std::io::Error) -> Self {
        InstallError::FileSystem {
            path: path.into(),
            operation,
            source,
        }
    }
}
