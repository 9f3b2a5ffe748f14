use bridge_core::guard::{GuardError, GuardedClient, PiiViolationError, RequestOptions, Value};

use crate::app::AppContext;
use crate::cli::GuardCommand;
use crate::errors::CliError;
use crate::helpers::{parse_header, read_input};
use crate::transport::ReqwestTransport;

fn parse_body(text: &str) -> anyhow::Result<Value> {
    Value::parse_json(text)
        .map_err(|e| CliError::invalid_input(format!("Payload is not valid JSON: {}", e)).into())
}

pub async fn handle_guard(ctx: &AppContext, command: &GuardCommand) -> anyhow::Result<()> {
    let policy = ctx.config.guard_policy();

    match command {
        GuardCommand::Scan { file, json } => {
            let value = parse_body(&read_input(file)?)?;
            let forbidden_key_paths = policy.denylist.scan(&value);
            if *json {
                println!("{}", serde_json::to_string_pretty(&forbidden_key_paths)?);
            } else {
                for path in &forbidden_key_paths {
                    println!("{}", path);
                }
            }
            if !forbidden_key_paths.is_empty() {
                return Err(CliError::from(PiiViolationError {
                    forbidden_key_paths,
                })
                .into());
            }
            if !ctx.quiet && !*json {
                eprintln!("No student identity keys found");
            }
        }
        GuardCommand::Send { url, file, headers } => {
            let body = read_input(file)?;
            let mut options = RequestOptions::post_json(body);
            for header in headers {
                let (name, value) = parse_header(header)?;
                options = options.with_header(name, value);
            }
            if !policy.enabled {
                tracing::warn!("PII guard disabled by configuration");
            }

            let client = GuardedClient::new(ReqwestTransport::default(), policy);
            let response = match client.call(url, options).await {
                Ok(response) => response,
                Err(GuardError::Violation(violation)) => return Err(CliError::from(violation).into()),
                Err(GuardError::Unscannable(err)) => return Err(CliError::from(err).into()),
                Err(GuardError::Transport(err)) => {
                    return Err(anyhow::anyhow!("Request to {} failed: {}", url, err))
                }
            };
            if !ctx.quiet {
                eprintln!("HTTP {}", response.status);
            }
            println!("{}", response.body);
        }
    }
    Ok(())
}
