//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// These follow common Unix conventions:
/// - 0: Success
/// - 1: General error (used by anyhow for unhandled errors)
/// - 2: Misuse of shell command (reserved by shells)
/// - 3+: Application-specific errors
pub mod exit_codes {
    /// Resource not found (config, bridge file, student).
    pub const NOT_FOUND: i32 = 3;

    /// Invalid user input or arguments.
    pub const INVALID_INPUT: i32 = 4;

    /// Unlock failed.
    pub const AUTH_FAILED: i32 = 5;

    /// Saving the bridge failed; nothing was written.
    pub const SAVE_FAILED: i32 = 6;

    /// The egress guard blocked a payload.
    pub const PII_BLOCKED: i32 = 7;
}

/// Environment variable holding the bridge passphrase for non-interactive use.
pub const PASSPHRASE_ENV: &str = "BRIDGE_PASSPHRASE";

/// Environment variable holding the new passphrase for `rotate`.
pub const NEW_PASSPHRASE_ENV: &str = "BRIDGE_NEW_PASSPHRASE";
