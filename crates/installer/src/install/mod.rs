//! Installation module
//!
//! This module classifies extracted mod archives and installs them into the
//! game folder according to their layout.

pub mod error;
pub mod fs_ops;
pub mod installer;
pub mod layout;

// Re-export commonly used types
pub use error::InstallError;
pub use installer::ModInstaller;
pub use layout::{Classification, Layout, METADATA_FILES, RECOGNIZED_SUBFOLDERS, classify, is_metadata_file};
