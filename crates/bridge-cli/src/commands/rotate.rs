use std::io::IsTerminal;

use secrecy::{ExposeSecret, SecretString};

use crate::app::AppContext;
use crate::errors::CliError;
use crate::helpers::{prompt_passphrase, prompt_rotated_passphrase};

use super::save_and_lock;

pub async fn handle_rotate(ctx: &AppContext) -> anyhow::Result<()> {
    ctx.ensure_bridge_exists()?;
    let interactive = std::io::stdin().is_terminal();
    let current = prompt_passphrase(interactive)?;
    let manager = ctx
        .unlocked_manager_with(SecretString::from(current.expose_secret().to_owned()))
        .await?;

    let replacement = match prompt_rotated_passphrase(interactive) {
        Ok(value) => value,
        Err(err) => {
            manager.lock();
            return Err(err);
        }
    };
    if let Err(err) = manager.rotate_passphrase(&current, replacement) {
        manager.lock();
        return Err(CliError::from(err).into());
    }
    save_and_lock(&manager).await?;

    if !ctx.quiet {
        println!("Passphrase changed for {}", ctx.bridge_path().display());
    }
    Ok(())
}
