use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bridge_core::bridge::{BridgeManager, BridgeProfile, BridgeSettings};
use bridge_core::storage::{EnvelopeStore, FileEnvelopeStore};

use crate::app::{load_config, resolve_config_path, resolve_store};
use crate::cli::{Cli, InitArgs};
use crate::config::write_config;
use crate::errors::CliError;
use crate::helpers::prompt_init_passphrase;

use super::save_and_lock;

fn profile_from_args(args: &InitArgs) -> BridgeProfile {
    let mut profile = BridgeProfile::new();
    if let Some(district) = &args.district {
        profile = profile.district(district);
    }
    if let Some(school) = &args.school {
        profile = profile.school(school);
    }
    if let Some(teacher) = &args.teacher {
        profile = profile.teacher_name(teacher);
    }
    profile
}

pub async fn handle_init(cli: &Cli, args: &InitArgs) -> anyhow::Result<()> {
    let mut config = load_config(cli)?;
    if let Some(iterations) = args.iterations {
        config.crypto.iterations = iterations;
        config
            .validate()
            .map_err(|e| CliError::invalid_input(e.to_string()))?;
    }

    let store = match args.path.as_deref() {
        Some(path) => FileEnvelopeStore::new(path),
        None => resolve_store(cli, &config)?,
    };
    if store.exists()? {
        return Err(CliError::invalid_input(format!(
            "A bridge already exists at {}",
            store.path().display()
        ))
        .into());
    }
    if let Some(parent) = store.path().parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!("Failed to create directory {}: {}", parent.display(), e)
        })?;
    }

    let passphrase = prompt_init_passphrase(std::io::stdin().is_terminal())?;
    let bridge_path = store.path().to_path_buf();
    let settings = BridgeSettings::with_iterations(config.crypto.iterations)?;
    let manager = BridgeManager::with_settings(Arc::new(store), settings);

    manager
        .create_new(passphrase, profile_from_args(args))
        .map_err(CliError::from)?;
    if !args.periods.is_empty() {
        manager.set_class_periods(args.periods.clone())?;
    }
    save_and_lock(&manager).await?;

    if args.write_config {
        let config_path = resolve_config_path(cli)?;
        config.bridge.path = Some(absolute(&bridge_path).to_string_lossy().to_string());
        write_config(&config_path, &config)?;
        if !cli.quiet {
            println!("Wrote config {}", config_path.display());
        }
    }

    if !cli.quiet {
        println!("Initialized new bridge at {}", bridge_path.display());
    }
    Ok(())
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
