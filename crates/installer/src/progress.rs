//! Progress tracking and reporting for a mod manager run

use std::sync::Arc;
use tracing::{error, info};

/// Progress callback for run events
pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Stage a mod failed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Check,
    Download,
    Install,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Check => write!(f, "checking"),
            Stage::Download => write!(f, "downloading"),
            Stage::Install => write!(f, "installing"),
        }
    }
}

/// Events emitted during a run
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    CheckStarted {
        total: usize,
    },
    CheckComplete {
        to_install: usize,
        up_to_date: usize,
        unresolved: usize,
    },
    UpToDate {
        name: String,
        version: String,
    },
    Downloading {
        name: String,
        version: String,
    },
    Downloaded {
        name: String,
        version: String,
    },
    Installed {
        name: String,
        version: String,
        layout: String,
    },
    Failed {
        name: String,
        version: String,
        stage: Stage,
        reason: String,
    },
}

/// Trait for progress reporting with more granular control
pub trait ProgressReporter: Send + Sync {
    fn on_check_started(&self, _total: usize) {}
    fn on_check_complete(&self, _to_install: usize, _up_to_date: usize, _unresolved: usize) {}
    fn on_up_to_date(&self, _name: &str, _version: &str) {}
    fn on_downloading(&self, _name: &str, _version: &str) {}
    fn on_downloaded(&self, _name: &str, _version: &str) {}
    fn on_installed(&self, _name: &str, _version: &str, _layout: &str) {}
    fn on_failed(&self, _name: &str, _version: &str, _stage: Stage, _reason: &str) {}
}

/// Extension trait to convert ProgressReporter to ProgressCallback
pub trait IntoProgressCallback {
    fn into_callback(self) -> ProgressCallback;
}

impl<T: ProgressReporter + 'static> IntoProgressCallback for T {
    fn into_callback(self) -> ProgressCallback {
        Arc::new(move |event| match event {
            ProgressEvent::CheckStarted { total } => self.on_check_started(total),
            ProgressEvent::CheckComplete { to_install, up_to_date, unresolved } => {
                self.on_check_complete(to_install, up_to_date, unresolved);
            }
            ProgressEvent::UpToDate { name, version } => self.on_up_to_date(&name, &version),
            ProgressEvent::Downloading { name, version } => self.on_downloading(&name, &version),
            ProgressEvent::Downloaded { name, version } => self.on_downloaded(&name, &version),
            ProgressEvent::Installed { name, version, layout } => {
                self.on_installed(&name, &version, &layout);
            }
            ProgressEvent::Failed { name, version, stage, reason } => {
                self.on_failed(&name, &version, stage, &reason);
            }
        })
    }
}

/// Reporter that writes every event to the `tracing` log
pub struct LogProgressReporter;

impl ProgressReporter for LogProgressReporter {
    fn on_check_started(&self, total: usize) {
        info!("Checking {} mods", total);
    }

    fn on_check_complete(&self, to_install: usize, up_to_date: usize, unresolved: usize) {
        if to_install == 0 {
            info!("Mods already up to date.");
        } else {
            info!("Finished checking mods. ({} mods to download)", to_install);
        }
        if up_to_date > 0 {
            info!("{} mods are up to date", up_to_date);
        }
        if unresolved > 0 {
            error!("{} mods could not be resolved and will be skipped", unresolved);
        }
    }

    fn on_up_to_date(&self, name: &str, version: &str) {
        info!("Up to date: {} v{}", name, version);
    }

    fn on_downloading(&self, name: &str, version: &str) {
        info!("Downloading {} v{}", name, version);
    }

    fn on_downloaded(&self, name: &str, version: &str) {
        info!("Downloaded {} v{}", name, version);
    }

    fn on_installed(&self, name: &str, version: &str, layout: &str) {
        info!("Installed {} v{} ({})", name, version, layout);
    }

    // Failures are logged by the manager itself
}
