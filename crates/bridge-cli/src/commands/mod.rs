//! Command handlers. Each takes the parsed arguments and returns once any
//! bridge it opened has been locked again.

pub mod envelope;
pub mod guard;
pub mod import;
pub mod init;
pub mod roster;
pub mod rotate;

use bridge_core::bridge::BridgeManager;

use crate::errors::CliError;

/// Save, then lock whatever the outcome.
pub(crate) async fn save_and_lock(manager: &BridgeManager) -> anyhow::Result<()> {
    let result = manager.save().await;
    manager.lock();
    result.map_err(CliError::from)?;
    Ok(())
}
