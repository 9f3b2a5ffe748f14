use std::io::{self, Read};

use dialoguer::Password;
use secrecy::SecretString;

use crate::constants::{NEW_PASSPHRASE_ENV, PASSPHRASE_ENV};
use crate::errors::CliError;

fn passphrase_from_env(name: &str) -> Option<SecretString> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(SecretString::from)
}

pub fn prompt_passphrase(interactive: bool) -> anyhow::Result<SecretString> {
    if let Some(value) = passphrase_from_env(PASSPHRASE_ENV) {
        return Ok(value);
    }
    if !interactive {
        return Err(CliError::auth_failed(format!(
            "No passphrase provided and no TTY available. Set {}.",
            PASSPHRASE_ENV
        ))
        .into());
    }
    Password::new()
        .with_prompt("Passphrase")
        .interact()
        .map(SecretString::from)
        .map_err(|e| anyhow::anyhow!("Failed to read passphrase: {}", e))
}

/// Prompt twice for a passphrase that will seal a bridge.
pub fn prompt_new_passphrase(env_name: &str, interactive: bool) -> anyhow::Result<SecretString> {
    if let Some(value) = passphrase_from_env(env_name) {
        return Ok(value);
    }
    if !interactive {
        return Err(CliError::invalid_input(format!(
            "No passphrase provided and no TTY available. Set {}.",
            env_name
        ))
        .into());
    }
    Password::new()
        .with_prompt("Enter passphrase")
        .with_confirmation("Confirm passphrase", "Passphrases do not match")
        .interact()
        .map(SecretString::from)
        .map_err(|e| anyhow::anyhow!("Failed to read passphrase: {}", e))
}

pub fn prompt_init_passphrase(interactive: bool) -> anyhow::Result<SecretString> {
    prompt_new_passphrase(PASSPHRASE_ENV, interactive)
}

pub fn prompt_rotated_passphrase(interactive: bool) -> anyhow::Result<SecretString> {
    prompt_new_passphrase(NEW_PASSPHRASE_ENV, interactive)
}

/// Read a file, or stdin when `path` is "-".
pub fn read_input(path: &str) -> anyhow::Result<String> {
    if path == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| anyhow::anyhow!("Failed to read stdin: {}", e))?;
        return Ok(buffer);
    }
    std::fs::read_to_string(path).map_err(|e| {
        CliError::not_found(format!("Failed to read {}: {}", path, e), None).into()
    })
}

/// Parse a `NAME:VALUE` header argument.
pub fn parse_header(value: &str) -> anyhow::Result<(String, String)> {
    let (name, header_value) = value
        .split_once(':')
        .ok_or_else(|| CliError::invalid_input(format!("Invalid header (expected NAME:VALUE): {}", value)))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(CliError::invalid_input(format!("Invalid header name: {}", value)).into());
    }
    Ok((name.to_string(), header_value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header() {
        assert_eq!(
            parse_header("Authorization: Bearer abc").unwrap(),
            ("Authorization".to_string(), "Bearer abc".to_string())
        );
        assert!(parse_header("no-colon").is_err());
        assert!(parse_header(": value").is_err());
    }

    #[test]
    fn test_read_input_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.csv");
        assert!(read_input(&missing.to_string_lossy()).is_err());
    }
}
