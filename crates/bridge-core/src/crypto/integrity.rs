//! HMAC-SHA256 integrity tag over the canonical plaintext.
//!
//! The tag is computed before encryption and checked after decryption. It is
//! redundant with the GCM tag on purpose: a mismatch here after a successful
//! decrypt means the sealed document was rebuilt by someone holding the key,
//! or the payload encoding drifted, and is reported as
//! [`BridgeError::Tampered`] instead of a passphrase failure.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{BridgeError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Length of an HMAC-SHA256 tag in bytes.
pub const TAG_LENGTH: usize = 32;

/// An integrity tag as stored in the envelope.
#[derive(Clone, PartialEq, Eq)]
pub struct IntegrityTag(Vec<u8>);

impl IntegrityTag {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        if bytes.len() != TAG_LENGTH {
            return Err(BridgeError::CorruptEnvelope(format!(
                "integrity tag must be {} bytes (got {})",
                TAG_LENGTH,
                bytes.len()
            )));
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for IntegrityTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("IntegrityTag").field(&self.0.len()).finish()
    }
}

fn mac(key_material: &[u8]) -> Result<HmacSha256> {
    <HmacSha256 as Mac>::new_from_slice(key_material)
        .map_err(|e| BridgeError::Crypto(format!("Failed to create HMAC: {}", e)))
}

/// Compute the tag for `data` under `key_material`.
pub fn compute_tag(key_material: &[u8], data: &[u8]) -> Result<IntegrityTag> {
    let mut mac = mac(key_material)?;
    mac.update(data);
    Ok(IntegrityTag(mac.finalize().into_bytes().to_vec()))
}

/// Verify `expected` against `data` in constant time.
pub fn verify_tag(key_material: &[u8], data: &[u8], expected: &IntegrityTag) -> Result<()> {
    let mut mac = mac(key_material)?;
    mac.update(data);
    mac.verify_slice(expected.as_bytes())
        .map_err(|_| BridgeError::Tampered)
}
