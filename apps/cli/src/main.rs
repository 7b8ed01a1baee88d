//! Command-line front end: installs and updates the mods listed in `mods.yml`

mod logging;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use installer::{
    GamePaths, IntoProgressCallback, LogProgressReporter, ManagerConfig, ModManager, RegistryConfig, RunSummary,
    THUNDERSTORE_URL, load_mod_list,
};
use tracing::{error, info, warn};

#[derive(Debug, Parser)]
#[command(name = "lc-modmanager", version, about = "Install and update BepInEx mods from Thunderstore")]
struct Args {
    /// Game installation folder (the one holding the game executable)
    #[arg(long, env = "LC_GAME_DIR")]
    game_dir: PathBuf,

    /// YAML list of mods to install
    #[arg(long, default_value = "mods.yml")]
    mods: PathBuf,

    /// Scratch folder for downloads, removed after the run
    #[arg(long, default_value = "temp")]
    temp_dir: PathBuf,

    #[arg(long, default_value = "latest.log")]
    log_file: PathBuf,

    /// Mods checked or installed at once
    #[arg(long, default_value_t = 5)]
    concurrency: usize,

    /// Package registry base URL
    #[arg(long, env = "LC_REGISTRY_URL", default_value = THUNDERSTORE_URL)]
    registry_url: String,

    /// Registry attempts per mod before giving up
    #[arg(long, default_value_t = 30)]
    max_attempts: usize,

    /// Leave the temp folder in place after the run
    #[arg(long)]
    keep_temp: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    logging::init(&args.log_file)?;

    if !args.game_dir.is_dir() {
        bail!("Game folder {} does not exist", args.game_dir.display());
    }

    let mods = load_mod_list(&args.mods)
        .await
        .with_context(|| format!("Failed to load mod list {}", args.mods.display()))?;
    info!("Loaded {} mods from {}", mods.len(), args.mods.display());

    let config = ManagerConfig {
        registry: RegistryConfig {
            base_url: args.registry_url,
            max_attempts: args.max_attempts,
            ..RegistryConfig::default()
        },
        max_concurrent: args.concurrency,
        clean_temp: !args.keep_temp,
    };
    let paths = GamePaths::new(args.game_dir, args.temp_dir);

    let manager = ModManager::new(config, paths)?.with_progress_callback(LogProgressReporter.into_callback());
    let summary = manager.run(mods).await?;

    report(&summary);
    Ok(())
}

fn report(summary: &RunSummary) {
    if !summary.up_to_date.is_empty() {
        info!("Up to date: {}", summary.up_to_date.join(", "));
    }
    if !summary.installed.is_empty() {
        info!("Installed: {}", summary.installed.join(", "));
    }
    for failure in &summary.unresolved {
        warn!("Not found: {} ({})", failure.name, failure.reason);
    }
    for failure in &summary.failed {
        error!(
            "Failed {} {} v{}: {}",
            failure.stage, failure.name, failure.version, failure.reason
        );
    }
}
