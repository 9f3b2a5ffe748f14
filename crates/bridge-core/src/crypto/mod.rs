//! Cryptographic operations for the student identity bridge.
//!
//! This module provides the primitives the envelope codec is built from,
//! using well-audited RustCrypto implementations:
//! - **PBKDF2-HMAC-SHA256**: passphrase key derivation
//! - **AES-256-GCM**: authenticated encryption of the roster
//! - **HMAC-SHA256**: independent integrity tag over the plaintext
//!
//! ## Security Model
//!
//! - Fresh random salt per envelope, fresh random nonce per encryption
//! - Iteration count travels with the envelope
//! - Derived keys and decrypted plaintext are zeroized on drop
//! - No plaintext passphrases are stored on disk
//!
//! ## Threat Model
//!
//! We defend against:
//! - Theft of the encrypted bridge file
//! - Offline brute-force attacks on the passphrase
//! - Silent modification of the bridge file
//!
//! We do NOT defend against:
//! - Compromised OS / keylogger
//! - Access to an unlocked session / process memory

pub mod aead;
pub mod integrity;
pub mod kdf;
pub mod passphrase;
pub mod random;

pub use aead::{decrypt, encrypt, FreshNonce, Nonce, NONCE_LENGTH};
pub use integrity::{compute_tag, verify_tag, IntegrityTag, TAG_LENGTH};
pub use kdf::{
    derive_key, DerivedKey, Salt, DEFAULT_ITERATIONS, KEY_LENGTH, MIN_ITERATIONS, SALT_LENGTH,
};
pub use passphrase::{passphrases_match, validate_passphrase};
