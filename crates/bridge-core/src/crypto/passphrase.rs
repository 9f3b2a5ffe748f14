//! Passphrase validation.
//!
//! Enforces minimum requirements for passphrases that will seal a bridge.
//! Unlocking never validates: an existing file is opened with whatever
//! passphrase was used to create it.

use subtle::ConstantTimeEq;

use crate::error::{BridgeError, Result};

/// Minimum passphrase length in characters.
const MIN_PASSPHRASE_LENGTH: usize = 8;

/// Validate passphrase meets minimum security requirements.
///
/// # Requirements
///
/// - At least 8 characters long
/// - Not empty or only whitespace
///
/// # Examples
///
/// ```
/// use bridge_core::crypto::validate_passphrase;
///
/// assert!(validate_passphrase("correct horse battery staple").is_ok());
/// assert!(validate_passphrase("short").is_err());
/// ```
pub fn validate_passphrase(passphrase: &str) -> Result<()> {
    if passphrase.trim().is_empty() {
        return Err(BridgeError::InvalidInput(
            "Passphrase cannot be empty".to_string(),
        ));
    }

    let length = passphrase.chars().count();
    if length < MIN_PASSPHRASE_LENGTH {
        return Err(BridgeError::InvalidInput(format!(
            "Passphrase must be at least {} characters (got {})",
            MIN_PASSPHRASE_LENGTH, length
        )));
    }

    Ok(())
}

/// Compare two passphrases in constant time for equal-length inputs.
pub fn passphrases_match(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_passphrase() {
        assert!(validate_passphrase("correct horse battery staple").is_ok());
        assert!(validate_passphrase("exactly12chr").is_ok());
    }

    #[test]
    fn test_passphrase_too_short() {
        let result = validate_passphrase("short");
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("at least 8 characters"));
    }

    #[test]
    fn test_passphrase_empty() {
        assert!(validate_passphrase("").is_err());
        assert!(validate_passphrase("   ").is_err());
        assert!(validate_passphrase("\n\t").is_err());
    }

    #[test]
    fn test_passphrase_counts_characters_not_bytes() {
        // 7 characters, 14 bytes
        assert!(validate_passphrase("ééééééé").is_err());
        assert!(validate_passphrase("éééééééé").is_ok());
    }

    #[test]
    fn test_passphrases_match() {
        assert!(passphrases_match("correct horse", "correct horse"));
        assert!(!passphrases_match("correct horse", "correct horsf"));
        assert!(!passphrases_match("correct horse", "correct"));
        assert!(!passphrases_match("", "x"));
    }
}
