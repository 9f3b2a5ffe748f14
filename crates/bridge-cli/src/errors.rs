//! CLI error type carrying an exit code and an optional hint.

use std::fmt;

use bridge_core::guard::{PiiViolationError, UnscannableBodyError};
use bridge_core::BridgeError;

use crate::constants::exit_codes;

#[derive(Debug)]
pub struct CliError {
    pub message: String,
    pub hint: Option<String>,
    pub exit_code: i32,
}

impl CliError {
    pub fn not_found(message: impl Into<String>, hint: Option<&str>) -> Self {
        Self::with_code(message, hint, exit_codes::NOT_FOUND)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::with_code(message, None, exit_codes::INVALID_INPUT)
    }

    pub fn auth_failed(message: impl Into<String>) -> Self {
        Self::with_code(message, None, exit_codes::AUTH_FAILED)
    }

    fn with_code(message: impl Into<String>, hint: Option<&str>, exit_code: i32) -> Self {
        Self {
            message: message.into(),
            hint: hint.map(str::to_string),
            exit_code,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<PiiViolationError> for CliError {
    fn from(err: PiiViolationError) -> Self {
        Self::with_code(err.to_string(), None, exit_codes::PII_BLOCKED)
    }
}

impl From<UnscannableBodyError> for CliError {
    fn from(err: UnscannableBodyError) -> Self {
        Self::with_code(
            err.to_string(),
            Some("Only well-formed JSON bodies can be checked and sent."),
            exit_codes::PII_BLOCKED,
        )
    }
}

fn classify(err: &BridgeError) -> (i32, Option<&'static str>) {
    match err {
        BridgeError::UnlockFailed
        | BridgeError::WrongPassphrase
        | BridgeError::Tampered
        | BridgeError::ConcurrentUnlockRejected => (exit_codes::AUTH_FAILED, None),
        BridgeError::BridgeNotFound => (
            exit_codes::NOT_FOUND,
            Some("Run `bridge init` to create one."),
        ),
        BridgeError::StudentNotFound(_) => (
            exit_codes::NOT_FOUND,
            Some("Use `bridge roster list` to see student ids."),
        ),
        BridgeError::InvalidInput(_) | BridgeError::DuplicateLocalId(_) => {
            (exit_codes::INVALID_INPUT, None)
        }
        BridgeError::SaveFailed(_) => (
            exit_codes::SAVE_FAILED,
            Some("Nothing was written. Fix the problem and retry."),
        ),
        _ => (1, None),
    }
}

impl From<BridgeError> for CliError {
    fn from(err: BridgeError) -> Self {
        let (code, hint) = classify(&err);
        Self::with_code(err.to_string(), hint, code)
    }
}

/// Exit code for any error reaching `main`.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    if let Some(cli) = err.downcast_ref::<CliError>() {
        return cli.exit_code;
    }
    if let Some(bridge) = err.downcast_ref::<BridgeError>() {
        return classify(bridge).0;
    }
    if err.downcast_ref::<PiiViolationError>().is_some() {
        return exit_codes::PII_BLOCKED;
    }
    1
}

/// Hint for any error reaching `main`, if one applies.
pub fn hint_for(err: &anyhow::Error) -> Option<String> {
    if let Some(cli) = err.downcast_ref::<CliError>() {
        return cli.hint.clone();
    }
    err.downcast_ref::<BridgeError>()
        .and_then(|bridge| classify(bridge).1)
        .map(str::to_string)
}
