//! Envelope store trait definition.
//!
//! The `EnvelopeStore` trait is the only persistence seam in the bridge. It
//! moves opaque envelopes and never sees plaintext, so implementations need
//! no knowledge of the roster format.

use crate::envelope::EncryptedBridgeEnvelope;
use crate::error::Result;

/// Persistence for the encrypted bridge envelope.
///
/// All implementations must ensure:
/// - `save` replaces the previous envelope atomically: readers see either
///   the old envelope or the new one, never a mix
/// - a failed `save` leaves the previous envelope in place
pub trait EnvelopeStore: Send + Sync {
    /// Read the current envelope, or `None` if nothing has been saved yet.
    fn load(&self) -> Result<Option<EncryptedBridgeEnvelope>>;

    /// Replace the stored envelope.
    fn save(&self, envelope: &EncryptedBridgeEnvelope) -> Result<()>;

    /// Whether an envelope has been saved.
    fn exists(&self) -> Result<bool> {
        Ok(self.load()?.is_some())
    }

    /// Human-readable location, for logs and messages.
    fn location(&self) -> String;
}
