//! Bridge CLI - manage the local student identity bridge
//!
//! The bridge maps the opaque student ids used by cloud services to real
//! names and district ids. It lives only on this machine, encrypted under a
//! passphrase. This binary creates and edits it, and checks outbound
//! payloads for identity keys before they are sent.

mod app;
mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod helpers;
mod output;
mod transport;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use bridge_core::VERSION;

use crate::app::AppContext;
use crate::cli::{Cli, Commands};
use crate::errors::{exit_code_for, hint_for};

fn init_tracing(verbose: u8) {
    // Unlock failure causes are logged at warn; keep them out of default output.
    let default_level = match verbose {
        0 => "error",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match &cli.command {
        Some(Commands::Init(args)) => commands::init::handle_init(&cli, args).await,
        Some(Commands::Roster(command)) => {
            let ctx = AppContext::new(&cli)?;
            commands::roster::handle_roster(&ctx, command).await
        }
        Some(Commands::Import(args)) => {
            let ctx = AppContext::new(&cli)?;
            commands::import::handle_import(&ctx, args).await
        }
        Some(Commands::Rotate) => {
            let ctx = AppContext::new(&cli)?;
            commands::rotate::handle_rotate(&ctx).await
        }
        Some(Commands::Envelope(command)) => {
            let ctx = AppContext::new(&cli)?;
            commands::envelope::handle_envelope(&ctx, command).await
        }
        Some(Commands::Guard(command)) => {
            let ctx = AppContext::new(&cli)?;
            commands::guard::handle_guard(&ctx, command).await
        }
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            generate(*shell, &mut cmd, "bridge", &mut std::io::stdout());
            Ok(())
        }
        None => {
            println!("Bridge v{}", VERSION);
            println!("\nRun `bridge --help` for usage information.");
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {}", err);
        if let Some(hint) = hint_for(&err) {
            eprintln!("Hint: {}", hint);
        }
        std::process::exit(exit_code_for(&err));
    }
}
