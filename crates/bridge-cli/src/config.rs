use std::path::{Path, PathBuf};

use bridge_core::crypto::{DEFAULT_ITERATIONS, MIN_ITERATIONS};
use bridge_core::guard::{Denylist, GuardPolicy};
use bridge_core::storage::DEFAULT_BRIDGE_FILENAME;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BridgeConfig {
    #[serde(default)]
    pub bridge: BridgeSection,
    #[serde(default)]
    pub crypto: CryptoSection,
    #[serde(default)]
    pub guard: GuardSection,
}

#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BridgeSection {
    /// Explicit bridge file
    pub path: Option<String>,
    /// Per-user bridge in the data directory, used when `path` is unset
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CryptoSection {
    pub iterations: u32,
}

impl Default for CryptoSection {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GuardSection {
    pub enabled: bool,
    pub extra_keys: Vec<String>,
}

impl Default for GuardSection {
    fn default() -> Self {
        Self {
            enabled: true,
            extra_keys: Vec::new(),
        }
    }
}

impl BridgeConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.crypto.iterations < MIN_ITERATIONS {
            return Err(anyhow::anyhow!(
                "crypto.iterations must be at least {} (got {})",
                MIN_ITERATIONS,
                self.crypto.iterations
            ));
        }
        Ok(())
    }

    pub fn guard_policy(&self) -> GuardPolicy {
        GuardPolicy {
            enabled: self.guard.enabled,
            denylist: Denylist::default().with_extra(self.guard.extra_keys.iter().cloned()),
        }
    }
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn default_bridge_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_data_dir()?.join(DEFAULT_BRIDGE_FILENAME))
}

pub fn read_config(path: &Path) -> anyhow::Result<BridgeConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    let config: BridgeConfig = toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))?;
    config.validate()?;
    Ok(config)
}

pub fn write_config(path: &Path, config: &BridgeConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create config directory {}: {}",
                parent.display(),
                e
            )
        })?;
    }
    let contents =
        toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {}", e))?;
    std::fs::write(path, contents)
        .map_err(|e| anyhow::anyhow!("Failed to write config {}: {}", path.display(), e))?;
    Ok(())
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("bridge"));
        }
    }
    Ok(home_dir()?.join(".config").join("bridge"))
}

pub fn xdg_data_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_DATA_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("bridge"));
        }
    }
    Ok(home_dir()?.join(".local").join("share").join("bridge"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}
