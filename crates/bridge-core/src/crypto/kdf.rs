//! Key derivation using PBKDF2-HMAC-SHA256.
//!
//! The iteration count is an input, not a constant: every envelope records
//! the count it was sealed with, and opening always uses that recorded value.
//! Raising [`DEFAULT_ITERATIONS`] therefore never breaks existing files.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::ZeroizeOnDrop;

use crate::crypto::random::fill_random;
use crate::error::{BridgeError, Result};

/// Length of the per-envelope salt in bytes.
pub const SALT_LENGTH: usize = 16;

/// Length of derived key in bytes (32 bytes = 256 bits for AES-256-GCM).
pub const KEY_LENGTH: usize = 32;

/// Lowest iteration count accepted when sealing a new envelope.
pub const MIN_ITERATIONS: u32 = 100_000;

/// Iteration count used for new envelopes unless configured otherwise.
pub const DEFAULT_ITERATIONS: u32 = 210_000;

/// Random salt bound to a single envelope.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Salt([u8; SALT_LENGTH]);

impl Salt {
    /// Generate a fresh salt from the OS CSPRNG.
    pub fn generate() -> Result<Self> {
        let mut bytes = [0u8; SALT_LENGTH];
        fill_random(&mut bytes)?;
        Ok(Self(bytes))
    }

    /// Rebuild a salt read back from an envelope.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let array: [u8; SALT_LENGTH] = bytes.try_into().map_err(|_| {
            BridgeError::CorruptEnvelope(format!(
                "salt must be {} bytes (got {})",
                SALT_LENGTH,
                bytes.len()
            ))
        })?;
        Ok(Self(array))
    }

    pub fn as_bytes(&self) -> &[u8; SALT_LENGTH] {
        &self.0
    }
}

impl std::fmt::Debug for Salt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Salt").field(&self.0.len()).finish()
    }
}

/// A symmetric key derived from a passphrase.
///
/// Key material is zeroized from memory when dropped.
#[derive(Clone, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; KEY_LENGTH],
}

impl DerivedKey {
    /// Get a reference to the raw key bytes.
    ///
    /// # Security
    ///
    /// Avoid storing or logging this value. Use only for immediate encryption operations.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Derive a 256-bit key from a passphrase.
///
/// Deterministic: the same passphrase, salt and iteration count always give
/// the same key. This never fails; a wrong passphrase only shows up later as
/// an AEAD verification failure.
///
/// This is deliberately slow (hundreds of milliseconds at the default
/// count). Async callers should run it on a blocking thread.
pub fn derive_key(passphrase: &str, salt: &Salt, iterations: u32) -> DerivedKey {
    let mut key = [0u8; KEY_LENGTH];
    pbkdf2_hmac::<Sha256>(passphrase.as_bytes(), salt.as_bytes(), iterations, &mut key);
    DerivedKey { key }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXED_SALT: Salt = Salt(*b"unique-salt-1234");

    #[test]
    fn test_key_derivation_deterministic() {
        let key1 = derive_key("test-passphrase", &FIXED_SALT, MIN_ITERATIONS);
        let key2 = derive_key("test-passphrase", &FIXED_SALT, MIN_ITERATIONS);

        assert_eq!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_different_salt_different_key() {
        let other = Salt(*b"another-salt-567");

        let key1 = derive_key("test-passphrase", &FIXED_SALT, MIN_ITERATIONS);
        let key2 = derive_key("test-passphrase", &other, MIN_ITERATIONS);

        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_different_passphrase_different_key() {
        let key1 = derive_key("passphrase-one", &FIXED_SALT, MIN_ITERATIONS);
        let key2 = derive_key("passphrase-two", &FIXED_SALT, MIN_ITERATIONS);

        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_iteration_count_changes_key() {
        let key1 = derive_key("test-passphrase", &FIXED_SALT, MIN_ITERATIONS);
        let key2 = derive_key("test-passphrase", &FIXED_SALT, MIN_ITERATIONS + 1);

        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_generated_salts_differ() {
        let a = Salt::generate().unwrap();
        let b = Salt::generate().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_salt_from_slice_rejects_wrong_length() {
        let result = Salt::from_slice(b"short");
        assert!(matches!(result, Err(BridgeError::CorruptEnvelope(_))));
    }

    #[test]
    fn test_derived_key_debug_redacts() {
        let key = derive_key("test-passphrase", &FIXED_SALT, MIN_ITERATIONS);

        let debug_output = format!("{:?}", key);
        assert!(debug_output.contains("REDACTED"));

        let key_hex = hex::encode(&key.as_bytes()[..4]);
        assert!(!debug_output.contains(&key_hex));
    }
}
