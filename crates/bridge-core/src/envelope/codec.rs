//! Sealing and opening bridge envelopes.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use zeroize::Zeroizing;

use super::{EncryptedBridgeEnvelope, EnvelopeVersion};
use crate::bridge::BridgePayload;
use crate::crypto::{
    compute_tag, decrypt, derive_key, encrypt, verify_tag, FreshNonce, IntegrityTag, Nonce, Salt,
    DEFAULT_ITERATIONS, MIN_ITERATIONS,
};
use crate::error::{BridgeError, Result};

/// Document sealed inside the ciphertext.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SealedDocument<'a> {
    version: &'a str,
    created_at: DateTime<Utc>,
    payload: &'a BridgePayload,
}

/// Document as read back after decryption; the payload stays raw so the
/// integrity tag is checked over exactly the bytes that were sealed.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OpenedDocument<'a> {
    version: String,
    #[serde(borrow)]
    payload: &'a RawValue,
}

/// Non-secret facts about an envelope, readable without a passphrase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvelopeSummary {
    pub version: String,
    pub supported: bool,
    pub iterations: u32,
    pub ciphertext_bytes: usize,
}

/// Seal `payload` under `passphrase` with the default iteration count.
///
/// This is the entry point used to create the first envelope from an
/// existing identity source.
pub fn serialize(payload: &BridgePayload, passphrase: &str) -> Result<EncryptedBridgeEnvelope> {
    serialize_with_iterations(payload, passphrase, DEFAULT_ITERATIONS)
}

/// Seal `payload` with an explicit PBKDF2 iteration count (at least
/// [`MIN_ITERATIONS`]). Salt and nonce are always freshly generated.
pub fn serialize_with_iterations(
    payload: &BridgePayload,
    passphrase: &str,
    iterations: u32,
) -> Result<EncryptedBridgeEnvelope> {
    if iterations < MIN_ITERATIONS {
        return Err(BridgeError::InvalidInput(format!(
            "Key derivation needs at least {} iterations (got {})",
            MIN_ITERATIONS, iterations
        )));
    }
    if let Some(id) = payload.duplicate_id() {
        return Err(BridgeError::InvalidInput(format!(
            "Duplicate student id in roster: {}",
            id
        )));
    }

    let canonical = Zeroizing::new(serde_json::to_vec(payload)?);
    let tag = compute_tag(passphrase.as_bytes(), &canonical)?;

    let document = SealedDocument {
        version: EnvelopeVersion::V1_TAG,
        created_at: Utc::now(),
        payload,
    };
    let plaintext = Zeroizing::new(serde_json::to_vec(&document)?);

    let salt = Salt::generate()?;
    let key = derive_key(passphrase, &salt, iterations);
    let (nonce, ciphertext) = encrypt(&key, FreshNonce::generate()?, &plaintext)?;

    tracing::debug!(
        iterations,
        students = payload.roster.len(),
        "sealed bridge envelope"
    );

    Ok(EncryptedBridgeEnvelope {
        version: EnvelopeVersion::current(),
        ciphertext_b64: STANDARD.encode(ciphertext),
        iv_b64: STANDARD.encode(nonce.as_bytes()),
        salt_b64: STANDARD.encode(salt.as_bytes()),
        iterations,
        hmac_b64: STANDARD.encode(tag.as_bytes()),
    })
}

/// Open an envelope.
///
/// # Errors
///
/// - [`BridgeError::UnsupportedVersion`] for any version other than "1.0"
/// - [`BridgeError::CorruptEnvelope`] for malformed fields or plaintext
/// - [`BridgeError::WrongPassphrase`] when AEAD verification fails
/// - [`BridgeError::Tampered`] when the integrity tag does not match
pub fn deserialize(envelope: &EncryptedBridgeEnvelope, passphrase: &str) -> Result<BridgePayload> {
    match &envelope.version {
        EnvelopeVersion::V1 => open_v1(envelope, passphrase),
        EnvelopeVersion::Unknown(tag) => Err(BridgeError::UnsupportedVersion(tag.clone())),
    }
}

fn decode_field(field: &str, value: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(value)
        .map_err(|e| BridgeError::CorruptEnvelope(format!("{} is not valid base64: {}", field, e)))
}

fn open_v1(envelope: &EncryptedBridgeEnvelope, passphrase: &str) -> Result<BridgePayload> {
    // The recorded count is used as-is; only a zero count is structurally invalid.
    if envelope.iterations == 0 {
        return Err(BridgeError::CorruptEnvelope(
            "iterations must be positive".to_string(),
        ));
    }

    let ciphertext = decode_field("ciphertextB64", &envelope.ciphertext_b64)?;
    let nonce = Nonce::from_slice(&decode_field("ivB64", &envelope.iv_b64)?)?;
    let salt = Salt::from_slice(&decode_field("saltB64", &envelope.salt_b64)?)?;
    let tag = IntegrityTag::from_bytes(decode_field("hmacB64", &envelope.hmac_b64)?)?;

    let key = derive_key(passphrase, &salt, envelope.iterations);
    let plaintext = decrypt(&key, &nonce, &ciphertext)?;

    let document: OpenedDocument<'_> = serde_json::from_slice(&plaintext)
        .map_err(|e| BridgeError::CorruptEnvelope(format!("sealed document unreadable: {}", e)))?;
    if document.version != EnvelopeVersion::V1_TAG {
        return Err(BridgeError::CorruptEnvelope(format!(
            "sealed document version {} does not match envelope version {}",
            document.version,
            EnvelopeVersion::V1_TAG
        )));
    }

    verify_tag(passphrase.as_bytes(), document.payload.get().as_bytes(), &tag)?;

    let payload: BridgePayload = serde_json::from_str(document.payload.get())
        .map_err(|e| BridgeError::CorruptEnvelope(format!("payload unreadable: {}", e)))?;
    if let Some(id) = payload.duplicate_id() {
        return Err(BridgeError::CorruptEnvelope(format!(
            "duplicate student id in roster: {}",
            id
        )));
    }

    Ok(payload)
}

/// Summarize an envelope without decrypting it.
pub fn inspect(envelope: &EncryptedBridgeEnvelope) -> EnvelopeSummary {
    EnvelopeSummary {
        version: envelope.version.as_str().to_string(),
        supported: envelope.version.is_supported(),
        iterations: envelope.iterations,
        ciphertext_bytes: STANDARD
            .decode(&envelope.ciphertext_b64)
            .map(|bytes| bytes.len())
            .unwrap_or(0),
    }
}

/// Render an envelope in its on-disk JSON form.
pub fn to_json(envelope: &EncryptedBridgeEnvelope) -> Result<String> {
    Ok(serde_json::to_string_pretty(envelope)?)
}

/// Parse an envelope from its on-disk JSON form.
pub fn from_json(text: &str) -> Result<EncryptedBridgeEnvelope> {
    serde_json::from_str(text)
        .map_err(|e| BridgeError::CorruptEnvelope(format!("envelope unreadable: {}", e)))
}
