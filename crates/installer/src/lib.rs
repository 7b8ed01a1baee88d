//! Mod Installer Library
//!
//! This library keeps a BepInEx game's mods in line with a mod list. It
//! resolves every mod against a Thunderstore-style package registry, skips
//! the ones whose installed version is current, and downloads, classifies
//! and installs the rest into `BepInEx/plugins/<author>-<name>/`.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use installer::{
//!     GamePaths, IntoProgressCallback, LogProgressReporter, ManagerConfig, ModManager,
//!     load_mod_list,
//! };
//!
//! # async fn example() -> installer::Result<()> {
//! let paths = GamePaths::new("/games/Lethal Company", "temp");
//! let mods = load_mod_list(std::path::Path::new("mods.yml")).await?;
//!
//! let manager = ModManager::new(ManagerConfig::default(), paths)?
//!     .with_progress_callback(LogProgressReporter.into_callback());
//!
//! let summary = manager.run(mods).await?;
//! println!("Installed {} mods", summary.installed.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Archive layouts
//!
//! Extracted archives are sorted into one of six layouts before anything is
//! written: `bepinex`, `subfolder` and `dll` at the archive root, or the same
//! three one directory down (`other/bepinex`, `other/subfolder`,
//! `other/dll`). See [`install::classify`].

pub mod batch;
pub mod config;
pub mod download;
pub mod error;
pub mod install;
pub mod mods;
pub mod progress;
pub mod registry;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types for convenience
pub use batch::{CheckOutcome, ModFailure, ModManager, ModOutcome, RunSummary};
pub use config::{GamePaths, ManagerConfig, RegistryConfig, THUNDERSTORE_URL};
pub use download::ArchiveDownloader;
pub use error::{FileOperation, ModError, Result, error_chain};
pub use install::{Classification, InstallError, Layout, ModInstaller, classify};
pub use mods::{Mod, load_mod_list};
pub use progress::{
    IntoProgressCallback, LogProgressReporter, ProgressCallback, ProgressEvent,
    ProgressReporter, Stage,
};
pub use registry::{PackageVersion, RegistryClient};
