//! # Bridge Core
//!
//! Core library for the student identity bridge: a local, passphrase-encrypted
//! map from the opaque student ids the cloud sees to the real names and
//! district ids that must never leave the device.
//!
//! ## Architecture
//!
//! - **crypto**: key derivation, AES-256-GCM, HMAC integrity tag
//! - **envelope**: versioned on-disk format and its codec
//! - **bridge**: roster model and the lock/unlock/save lifecycle
//! - **storage**: envelope persistence (atomic file, in-memory)
//! - **guard**: egress guard that blocks identity keys in outbound requests

pub mod bridge;
pub mod crypto;
pub mod envelope;
pub mod error;
pub mod fs;
pub mod guard;
pub mod storage;

pub use bridge::{BridgeManager, BridgePayload, BridgeState, RosterEntry, StudentId};
pub use envelope::EncryptedBridgeEnvelope;
pub use error::{BridgeError, Result};
pub use storage::EnvelopeStore;

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
