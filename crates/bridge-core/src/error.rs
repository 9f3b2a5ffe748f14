//! Error types for bridge core operations.
//!
//! Errors are descriptive at the core level so they can be logged and tested
//! precisely. The one exception is [`BridgeError::UnlockFailed`]: every unlock
//! failure collapses into it before reaching a caller, so the message cannot
//! be used to tell a wrong passphrase apart from a damaged file.

use thiserror::Error;

use crate::bridge::StudentId;

/// Result type alias for bridge operations.
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Core error type for bridge operations.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// AEAD verification failed while opening an envelope
    #[error("Incorrect passphrase")]
    WrongPassphrase,

    /// Decryption succeeded but the integrity tag did not match
    #[error("Integrity check failed: bridge contents were modified")]
    Tampered,

    /// Envelope fields are malformed or inconsistent
    #[error("Corrupt bridge envelope: {0}")]
    CorruptEnvelope(String),

    /// Envelope version tag is not one this build understands
    #[error("Unsupported bridge version: {0}")]
    UnsupportedVersion(String),

    /// Generic unlock failure shown to end users, whatever the cause
    #[error("Unable to unlock the bridge. Check your passphrase and try again.")]
    UnlockFailed,

    /// An unlock was requested while another one is still running
    #[error("An unlock is already in progress")]
    ConcurrentUnlockRejected,

    /// Unlock requested while the bridge is already open
    #[error("Bridge is already unlocked")]
    AlreadyUnlocked,

    /// Operation requires an unlocked bridge
    #[error("Bridge is locked")]
    Locked,

    /// No envelope has been saved yet
    #[error("Bridge file not found")]
    BridgeNotFound,

    /// Persisting the envelope failed; in-memory edits are kept
    #[error("Failed to save bridge: {0}")]
    SaveFailed(String),

    /// Another roster entry already uses this local ID
    #[error("Student with local ID \"{0}\" already exists")]
    DuplicateLocalId(String),

    /// Roster entry not found by UUID
    #[error("Student not found: {0}")]
    StudentNotFound(StudentId),

    /// Invalid user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Cryptographic primitive failure (RNG, cipher setup)
    #[error("Encryption error: {0}")]
    Crypto(String),

    /// Storage backend error (generic)
    #[error("Storage error: {0}")]
    Storage(String),

    /// I/O error
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

impl BridgeError {
    /// Short, stable label for the failure cause, used in internal logs.
    pub fn cause_label(&self) -> &'static str {
        match self {
            BridgeError::WrongPassphrase => "aead_verification_failed",
            BridgeError::Tampered => "integrity_tag_mismatch",
            BridgeError::CorruptEnvelope(_) => "corrupt_envelope",
            BridgeError::UnsupportedVersion(_) => "unsupported_version",
            BridgeError::UnlockFailed => "unlock_failed",
            BridgeError::ConcurrentUnlockRejected => "concurrent_unlock",
            BridgeError::AlreadyUnlocked => "already_unlocked",
            BridgeError::Locked => "locked",
            BridgeError::BridgeNotFound => "not_found",
            BridgeError::SaveFailed(_) => "save_failed",
            BridgeError::DuplicateLocalId(_) => "duplicate_local_id",
            BridgeError::StudentNotFound(_) => "student_not_found",
            BridgeError::InvalidInput(_) => "invalid_input",
            BridgeError::Crypto(_) => "crypto",
            BridgeError::Storage(_) => "storage",
            BridgeError::Io { .. } => "io",
            BridgeError::Json { .. } => "json",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlock_failed_message_is_generic() {
        let message = BridgeError::UnlockFailed.to_string();
        assert!(!message.to_lowercase().contains("integrity"));
        assert!(!message.to_lowercase().contains("corrupt"));
        assert!(!message.to_lowercase().contains("version"));
    }

    #[test]
    fn test_cause_labels_distinguish_open_failures() {
        assert_ne!(
            BridgeError::WrongPassphrase.cause_label(),
            BridgeError::Tampered.cause_label()
        );
        assert_eq!(
            BridgeError::CorruptEnvelope("x".into()).cause_label(),
            "corrupt_envelope"
        );
    }
}
