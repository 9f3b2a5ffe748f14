use bridge_core::envelope;
use bridge_core::storage::EnvelopeStore;

use crate::app::AppContext;
use crate::cli::EnvelopeCommand;
use crate::errors::CliError;
use crate::output::print_summary;

pub async fn handle_envelope(ctx: &AppContext, command: &EnvelopeCommand) -> anyhow::Result<()> {
    match command {
        EnvelopeCommand::Inspect { json } => {
            ctx.ensure_bridge_exists()?;
            let sealed = ctx
                .store()
                .load()?
                .ok_or_else(|| CliError::from(bridge_core::BridgeError::BridgeNotFound))?;
            print_summary(&envelope::inspect(&sealed), *json)?;
        }
        EnvelopeCommand::Export { destination } => {
            let manager = ctx.unlocked_manager().await?;
            let exported = manager.export_envelope().await;
            manager.lock();
            let json = envelope::to_json(&exported?)?;
            bridge_core::fs::write_atomic(std::path::Path::new(destination), json.as_bytes())
                .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", destination, e))?;
            if !ctx.quiet {
                println!("Exported bridge to {}", destination);
            }
        }
    }
    Ok(())
}
