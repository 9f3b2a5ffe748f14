//! Versioned encrypted envelope for the bridge payload.
//!
//! ## Format (version "1.0")
//!
//! ```json
//! {
//!   "version": "1.0",
//!   "ciphertextB64": "...",   // AES-256-GCM(sealed document) || tag
//!   "ivB64": "...",           // 12-byte nonce
//!   "saltB64": "...",         // 16-byte PBKDF2 salt
//!   "iterations": 210000,     // PBKDF2 rounds used for this file
//!   "hmacB64": "..."          // HMAC-SHA256(passphrase, payload JSON)
//! }
//! ```
//!
//! The sealed document is `{"version","createdAt","payload"}`. All binary
//! fields use standard base64 with padding.

mod codec;

use serde::{Deserialize, Serialize};

pub use codec::{
    deserialize, from_json, inspect, serialize, serialize_with_iterations, to_json,
    EnvelopeSummary,
};

/// Version tag of an envelope.
///
/// Parsing never fails on an unrecognized tag; it is kept as
/// [`EnvelopeVersion::Unknown`] and rejected when the envelope is opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EnvelopeVersion {
    /// PBKDF2-SHA256 / AES-256-GCM / HMAC-SHA256
    V1,
    Unknown(String),
}

impl EnvelopeVersion {
    pub const V1_TAG: &'static str = "1.0";

    /// The version written by this build.
    pub fn current() -> Self {
        EnvelopeVersion::V1
    }

    pub fn as_str(&self) -> &str {
        match self {
            EnvelopeVersion::V1 => Self::V1_TAG,
            EnvelopeVersion::Unknown(tag) => tag,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, EnvelopeVersion::Unknown(_))
    }
}

impl From<String> for EnvelopeVersion {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            EnvelopeVersion::V1_TAG => EnvelopeVersion::V1,
            _ => EnvelopeVersion::Unknown(tag),
        }
    }
}

impl From<EnvelopeVersion> for String {
    fn from(version: EnvelopeVersion) -> Self {
        version.as_str().to_string()
    }
}

/// The persisted, encrypted form of a bridge.
///
/// Envelopes are never edited: every save builds a new one with fresh salt
/// and nonce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedBridgeEnvelope {
    version: EnvelopeVersion,
    #[serde(rename = "ciphertextB64")]
    ciphertext_b64: String,
    #[serde(rename = "ivB64")]
    iv_b64: String,
    #[serde(rename = "saltB64")]
    salt_b64: String,
    iterations: u32,
    #[serde(rename = "hmacB64")]
    hmac_b64: String,
}

impl EncryptedBridgeEnvelope {
    pub fn version(&self) -> &EnvelopeVersion {
        &self.version
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn ciphertext_b64(&self) -> &str {
        &self.ciphertext_b64
    }

    pub fn iv_b64(&self) -> &str {
        &self.iv_b64
    }

    pub fn salt_b64(&self) -> &str {
        &self.salt_b64
    }

    pub fn hmac_b64(&self) -> &str {
        &self.hmac_b64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_round_trips_known_tag() {
        let version: EnvelopeVersion = serde_json::from_str("\"1.0\"").unwrap();
        assert_eq!(version, EnvelopeVersion::V1);
        assert_eq!(serde_json::to_string(&version).unwrap(), "\"1.0\"");
    }

    #[test]
    fn test_version_keeps_unknown_tag() {
        let version: EnvelopeVersion = serde_json::from_str("\"2.0\"").unwrap();
        assert_eq!(version, EnvelopeVersion::Unknown("2.0".to_string()));
        assert!(!version.is_supported());
        assert_eq!(serde_json::to_string(&version).unwrap(), "\"2.0\"");
    }
}
