//! Check and install phases over a whole mod list
//!
//! Both phases run at most [`ManagerConfig::max_concurrent`] mods at once.
//! A mod that fails in either phase is reported and dropped from the run;
//! it never takes the other mods down with it.

use futures::stream::{self, StreamExt};
use tracing::{debug, error, info, warn};

use crate::config::{GamePaths, ManagerConfig};
use crate::download::ArchiveDownloader;
use crate::error::{ModError, Result, error_chain};
use crate::install::ModInstaller;
use crate::mods::Mod;
use crate::progress::{ProgressCallback, ProgressEvent, Stage};
use crate::registry::RegistryClient;

/// A mod that dropped out of the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModFailure {
    pub name: String,
    pub version: String,
    pub stage: Stage,
    pub reason: String,
}

/// Result of the check phase
#[derive(Debug, Default)]
pub struct CheckOutcome {
    pub up_to_date: Vec<Mod>,
    pub to_install: Vec<Mod>,
    pub unresolved: Vec<ModFailure>,
}

/// Result of installing a single mod
#[derive(Debug)]
pub enum ModOutcome {
    Installed { m: Mod, layout: String },
    Failed(ModFailure),
}

/// What a full run did, names sorted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub up_to_date: Vec<String>,
    pub installed: Vec<String>,
    pub failed: Vec<ModFailure>,
    pub unresolved: Vec<ModFailure>,
}

impl RunSummary {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty() || !self.unresolved.is_empty()
    }
}

/// Drives registry checks, downloads and installs for a mod list
pub struct ModManager {
    config: ManagerConfig,
    paths: GamePaths,
    registry: RegistryClient,
    downloader: ArchiveDownloader,
    installer: ModInstaller,
    progress: Option<ProgressCallback>,
}

impl ModManager {
    pub fn new(config: ManagerConfig, paths: GamePaths) -> Result<Self> {
        let registry = RegistryClient::new(config.registry.clone())?;
        let downloader = ArchiveDownloader::new(registry.http().clone());
        let installer = ModInstaller::new(paths.clone());

        Ok(Self {
            config,
            paths,
            registry,
            downloader,
            installer,
            progress: None,
        })
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    pub fn paths(&self) -> &GamePaths {
        &self.paths
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(ref callback) = self.progress {
            callback(event);
        }
    }

    fn concurrency(&self) -> usize {
        self.config.max_concurrent.max(1)
    }

    /// Run the check phase, then install everything that is missing or stale
    pub async fn run(&self, mods: Vec<Mod>) -> Result<RunSummary> {
        self.paths.prepare().await?;

        let check = self.check_mods(mods).await;
        let mut summary = RunSummary {
            up_to_date: check.up_to_date.iter().map(|m| m.name.clone()).collect(),
            unresolved: check.unresolved,
            ..RunSummary::default()
        };

        for outcome in self.install_mods(check.to_install).await {
            match outcome {
                ModOutcome::Installed { m, .. } => summary.installed.push(m.name),
                ModOutcome::Failed(failure) => summary.failed.push(failure),
            }
        }
        summary.installed.sort();
        summary.failed.sort_by(|a, b| a.name.cmp(&b.name));

        if self.config.clean_temp {
            self.clean_temp().await;
        }

        info!("Installed {} mods.", summary.installed.len());
        Ok(summary)
    }

    /// Resolve every mod against the registry and sort it into a bucket
    pub async fn check_mods(&self, mods: Vec<Mod>) -> CheckOutcome {
        self.emit(ProgressEvent::CheckStarted { total: mods.len() });

        let results: Vec<(Mod, Result<()>)> = stream::iter(mods)
            .map(|mut m| async move {
                let result = self.registry.fetch_info(&mut m, &self.paths).await;
                (m, result)
            })
            .buffer_unordered(self.concurrency())
            .collect()
            .await;

        let mut outcome = CheckOutcome::default();
        for (m, result) in results {
            match result {
                Ok(()) if m.is_up_to_date => {
                    debug!("{} is up to date", m);
                    self.emit(ProgressEvent::UpToDate {
                        name: m.name.clone(),
                        version: m.version_label().to_string(),
                    });
                    outcome.up_to_date.push(m);
                }
                Ok(()) => outcome.to_install.push(m),
                Err(e) => {
                    warn!("Skipping {}: registry lookup failed ({}): {}", m.name, e.category(), error_chain(&e));
                    outcome.unresolved.push(self.failure(&m, Stage::Check, &e));
                }
            }
        }

        outcome.up_to_date.sort_by(|a, b| a.name.cmp(&b.name));
        outcome.to_install.sort_by(|a, b| a.name.cmp(&b.name));
        outcome.unresolved.sort_by(|a, b| a.name.cmp(&b.name));

        self.emit(ProgressEvent::CheckComplete {
            to_install: outcome.to_install.len(),
            up_to_date: outcome.up_to_date.len(),
            unresolved: outcome.unresolved.len(),
        });
        outcome
    }

    /// Download then install each mod; each mod's download finishes before its install starts
    pub async fn install_mods(&self, mods: Vec<Mod>) -> Vec<ModOutcome> {
        stream::iter(mods)
            .map(|m| self.install_one(m))
            .buffer_unordered(self.concurrency())
            .collect()
            .await
    }

    async fn install_one(&self, m: Mod) -> ModOutcome {
        self.emit(ProgressEvent::Downloading {
            name: m.name.clone(),
            version: m.version_label().to_string(),
        });

        let extracted = match self.downloader.download(&m, &self.paths).await {
            Ok(path) => path,
            Err(e) => {
                error!("Failed to download {}: {}", m, error_chain(&e));
                return ModOutcome::Failed(self.failure(&m, Stage::Download, &e));
            }
        };

        self.emit(ProgressEvent::Downloaded {
            name: m.name.clone(),
            version: m.version_label().to_string(),
        });

        let installer = self.installer.clone();
        let folder_name = m.folder_name.clone();
        let result = tokio::task::spawn_blocking(move || installer.install(&folder_name, &extracted))
            .await
            .map_err(ModError::from)
            .and_then(|r| r.map_err(ModError::from));

        match result {
            Ok(classification) => {
                let layout = classification.tag();
                self.emit(ProgressEvent::Installed {
                    name: m.name.clone(),
                    version: m.version_label().to_string(),
                    layout: layout.clone(),
                });
                ModOutcome::Installed { m, layout }
            }
            Err(e) => {
                error!("Failed to install {}: {}", m, error_chain(&e));
                ModOutcome::Failed(self.failure(&m, Stage::Install, &e))
            }
        }
    }

    fn failure(&self, m: &Mod, stage: Stage, error: &ModError) -> ModFailure {
        let failure = ModFailure {
            name: m.name.clone(),
            version: m.version_label().to_string(),
            stage,
            reason: error_chain(error),
        };
        self.emit(ProgressEvent::Failed {
            name: failure.name.clone(),
            version: failure.version.clone(),
            stage,
            reason: failure.reason.clone(),
        });
        failure
    }

    async fn clean_temp(&self) {
        match tokio::fs::remove_dir_all(&self.paths.temp_folder).await {
            Ok(()) => debug!("Removed {}", self.paths.temp_folder.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Could not remove {}: {}", self.paths.temp_folder.display(), e),
        }
    }
}

#[cfg(test)]
mod tests;
