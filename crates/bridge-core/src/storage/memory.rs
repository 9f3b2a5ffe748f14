//! In-process envelope store.

use std::sync::Mutex;

use crate::envelope::EncryptedBridgeEnvelope;
use crate::error::{BridgeError, Result};
use crate::storage::traits::EnvelopeStore;

/// Keeps the envelope in memory. Useful for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryEnvelopeStore {
    slot: Mutex<Slot>,
}

#[derive(Debug, Default)]
struct Slot {
    envelope: Option<EncryptedBridgeEnvelope>,
    saves: usize,
}

impl MemoryEnvelopeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing envelope, e.g. one produced by a migration.
    pub fn with_envelope(envelope: EncryptedBridgeEnvelope) -> Self {
        Self {
            slot: Mutex::new(Slot {
                envelope: Some(envelope),
                saves: 0,
            }),
        }
    }

    /// Number of successful saves since construction.
    pub fn save_count(&self) -> usize {
        self.slot.lock().map(|slot| slot.saves).unwrap_or(0)
    }

    fn lock_slot(&self) -> Result<std::sync::MutexGuard<'_, Slot>> {
        self.slot
            .lock()
            .map_err(|_| BridgeError::Storage("Envelope store poisoned".to_string()))
    }
}

impl EnvelopeStore for MemoryEnvelopeStore {
    fn load(&self) -> Result<Option<EncryptedBridgeEnvelope>> {
        Ok(self.lock_slot()?.envelope.clone())
    }

    fn save(&self, envelope: &EncryptedBridgeEnvelope) -> Result<()> {
        let mut slot = self.lock_slot()?;
        slot.envelope = Some(envelope.clone());
        slot.saves += 1;
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
