//! Command context: resolved config, bridge location, and an unlocked manager.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

use bridge_core::bridge::{BridgeManager, BridgeSettings};
use bridge_core::storage::{EnvelopeStore, FileEnvelopeStore};
use secrecy::SecretString;

use crate::cli::Cli;
use crate::config::{default_bridge_path, default_config_path, read_config, xdg_data_dir, BridgeConfig};
use crate::errors::CliError;
use crate::helpers::prompt_passphrase;

pub struct AppContext {
    pub config: BridgeConfig,
    pub quiet: bool,
    store: Arc<FileEnvelopeStore>,
}

pub fn resolve_config_path(cli: &Cli) -> anyhow::Result<PathBuf> {
    match cli.config.as_deref().map(str::trim) {
        Some(value) if !value.is_empty() => Ok(PathBuf::from(value)),
        _ => default_config_path(),
    }
}

/// Load the config file if present; a missing file means defaults.
pub fn load_config(cli: &Cli) -> anyhow::Result<BridgeConfig> {
    let path = resolve_config_path(cli)?;
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file; using defaults");
        return Ok(BridgeConfig::default());
    }
    read_config(&path)
}

/// Pick the envelope store: `--bridge`/`BRIDGE_PATH`, then `bridge.path`,
/// then a per-user file when `bridge.user_id` is set, then the default file.
pub fn resolve_store(cli: &Cli, config: &BridgeConfig) -> anyhow::Result<FileEnvelopeStore> {
    if let Some(path) = cli.bridge.as_deref().filter(|p| !p.trim().is_empty()) {
        return Ok(FileEnvelopeStore::new(path));
    }
    if let Some(path) = config.bridge.path.as_deref() {
        return Ok(FileEnvelopeStore::new(path));
    }
    if let Some(user_id) = config.bridge.user_id.as_deref() {
        let store = FileEnvelopeStore::for_user(xdg_data_dir()?, user_id)
            .map_err(|e| CliError::invalid_input(e.to_string()))?;
        return Ok(store);
    }
    Ok(FileEnvelopeStore::new(default_bridge_path()?))
}

impl AppContext {
    pub fn new(cli: &Cli) -> anyhow::Result<Self> {
        let config = load_config(cli)?;
        let store = resolve_store(cli, &config)?;
        Ok(Self {
            config,
            quiet: cli.quiet,
            store: Arc::new(store),
        })
    }

    pub fn bridge_path(&self) -> PathBuf {
        self.store.path().to_path_buf()
    }

    pub fn store(&self) -> &FileEnvelopeStore {
        &self.store
    }

    pub fn settings(&self) -> anyhow::Result<BridgeSettings> {
        Ok(BridgeSettings::with_iterations(self.config.crypto.iterations)?)
    }

    pub fn manager(&self) -> anyhow::Result<BridgeManager> {
        let store: Arc<dyn EnvelopeStore> = self.store.clone();
        Ok(BridgeManager::with_settings(store, self.settings()?))
    }

    pub fn ensure_bridge_exists(&self) -> anyhow::Result<()> {
        if self.store.exists()? {
            return Ok(());
        }
        Err(CliError::not_found(
            format!("No bridge found at {}", self.store.path().display()),
            Some("Run `bridge init` to create one, or pass --bridge."),
        )
        .into())
    }

    /// A manager over the configured bridge, unlocked with a prompted passphrase.
    pub async fn unlocked_manager(&self) -> anyhow::Result<BridgeManager> {
        self.ensure_bridge_exists()?;
        let passphrase = prompt_passphrase(std::io::stdin().is_terminal())?;
        self.unlocked_manager_with(passphrase).await
    }

    pub async fn unlocked_manager_with(
        &self,
        passphrase: SecretString,
    ) -> anyhow::Result<BridgeManager> {
        self.ensure_bridge_exists()?;
        let manager = self.manager()?;
        manager.unlock(passphrase).await.map_err(CliError::from)?;
        Ok(manager)
    }
}
