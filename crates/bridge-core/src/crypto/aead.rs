//! AES-256-GCM authenticated encryption.
//!
//! Nonce reuse under one key breaks GCM completely, so the API makes it
//! unrepresentable: [`encrypt`] consumes a [`FreshNonce`], which can only be
//! produced by [`FreshNonce::generate`] and is neither `Clone` nor `Copy`.
//! Nonces parsed from an existing envelope are plain [`Nonce`] values and are
//! only accepted by [`decrypt`].

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce as GcmNonce};
use zeroize::Zeroizing;

use crate::crypto::kdf::DerivedKey;
use crate::crypto::random::fill_random;
use crate::error::{BridgeError, Result};

/// Size of the AES-GCM nonce in bytes (96 bits).
pub const NONCE_LENGTH: usize = 12;

/// A nonce that has never been used for encryption.
pub struct FreshNonce([u8; NONCE_LENGTH]);

impl FreshNonce {
    /// Generate a cryptographically random nonce.
    pub fn generate() -> Result<Self> {
        let mut bytes = [0u8; NONCE_LENGTH];
        fill_random(&mut bytes)?;
        Ok(Self(bytes))
    }
}

/// A nonce as recorded alongside a ciphertext.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Nonce([u8; NONCE_LENGTH]);

impl Nonce {
    /// Rebuild a nonce read back from an envelope.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let array: [u8; NONCE_LENGTH] = bytes.try_into().map_err(|_| {
            BridgeError::CorruptEnvelope(format!(
                "nonce must be {} bytes (got {})",
                NONCE_LENGTH,
                bytes.len()
            ))
        })?;
        Ok(Self(array))
    }

    pub fn as_bytes(&self) -> &[u8; NONCE_LENGTH] {
        &self.0
    }
}

fn cipher(key: &DerivedKey) -> Result<Aes256Gcm> {
    Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| BridgeError::Crypto(format!("Failed to create cipher: {}", e)))
}

/// Encrypt `plaintext`, returning the nonce that was consumed and the
/// ciphertext (with the 16-byte GCM tag appended).
pub fn encrypt(key: &DerivedKey, nonce: FreshNonce, plaintext: &[u8]) -> Result<(Nonce, Vec<u8>)> {
    let ciphertext = cipher(key)?
        .encrypt(GcmNonce::from_slice(&nonce.0), plaintext)
        .map_err(|_| BridgeError::Crypto("Encryption failed".to_string()))?;
    Ok((Nonce(nonce.0), ciphertext))
}

/// Decrypt and authenticate `ciphertext`.
///
/// Fails closed with [`BridgeError::WrongPassphrase`] on any tag mismatch;
/// no plaintext is returned in that case.
pub fn decrypt(key: &DerivedKey, nonce: &Nonce, ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    cipher(key)?
        .decrypt(GcmNonce::from_slice(nonce.as_bytes()), ciphertext)
        .map(Zeroizing::new)
        .map_err(|_| BridgeError::WrongPassphrase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::kdf::{derive_key, Salt, MIN_ITERATIONS};

    fn test_key(passphrase: &str) -> DerivedKey {
        let salt = Salt::from_slice(b"aead-test-salt-1").unwrap();
        derive_key(passphrase, &salt, MIN_ITERATIONS)
    }

    #[test]
    fn test_encrypt_decrypt_round_trip() {
        let key = test_key("test-passphrase-secure-123");
        let plaintext = b"Hello, World! This is secret data.";

        let (nonce, ciphertext) = encrypt(&key, FreshNonce::generate().unwrap(), plaintext).unwrap();
        let decrypted = decrypt(&key, &nonce, &ciphertext).unwrap();

        assert_eq!(decrypted.as_slice(), plaintext);
    }

    #[test]
    fn test_ciphertext_differs_from_plaintext() {
        let key = test_key("test-passphrase-secure-123");
        let plaintext = b"secret data";

        let (_, ciphertext) = encrypt(&key, FreshNonce::generate().unwrap(), plaintext).unwrap();

        assert_ne!(ciphertext.as_slice(), plaintext);
        assert_eq!(ciphertext.len(), plaintext.len() + 16);
    }

    #[test]
    fn test_wrong_key_fails_closed() {
        let key = test_key("correct-passphrase-123");
        let wrong = test_key("wrong-passphrase-456");

        let (nonce, ciphertext) =
            encrypt(&key, FreshNonce::generate().unwrap(), b"secret data").unwrap();
        let result = decrypt(&wrong, &nonce, &ciphertext);

        assert!(matches!(result, Err(BridgeError::WrongPassphrase)));
    }

    #[test]
    fn test_flipped_bit_fails_closed() {
        let key = test_key("test-passphrase-secure-123");
        let (nonce, mut ciphertext) =
            encrypt(&key, FreshNonce::generate().unwrap(), b"secret data").unwrap();

        let middle = ciphertext.len() / 2;
        ciphertext[middle] ^= 0x01;

        assert!(matches!(
            decrypt(&key, &nonce, &ciphertext),
            Err(BridgeError::WrongPassphrase)
        ));
    }

    #[test]
    fn test_each_encryption_uses_new_nonce() {
        let key = test_key("test-passphrase-secure-123");

        let (nonce1, ct1) = encrypt(&key, FreshNonce::generate().unwrap(), b"same").unwrap();
        let (nonce2, ct2) = encrypt(&key, FreshNonce::generate().unwrap(), b"same").unwrap();

        assert_ne!(nonce1, nonce2);
        assert_ne!(ct1, ct2);
    }

    #[test]
    fn test_nonce_from_slice_rejects_wrong_length() {
        assert!(matches!(
            Nonce::from_slice(&[0u8; 16]),
            Err(BridgeError::CorruptEnvelope(_))
        ));
    }
}
