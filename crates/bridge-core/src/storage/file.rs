//! File-backed envelope store.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::envelope::{self, EncryptedBridgeEnvelope};
use crate::error::{BridgeError, Result};
use crate::storage::traits::EnvelopeStore;

/// Default file name for a bridge.
pub const DEFAULT_BRIDGE_FILENAME: &str = "students.bridge.json.enc";

const USER_FILENAME_PREFIX: &str = "encrypted-bridge-user-";
const USER_FILENAME_SUFFIX: &str = ".bridge.json.enc";

/// Stores the envelope as pretty-printed JSON at a fixed path.
#[derive(Debug, Clone)]
pub struct FileEnvelopeStore {
    path: PathBuf,
}

impl FileEnvelopeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// A store whose file name is scoped to one application user, so two
    /// accounts sharing a machine never open each other's bridge.
    pub fn for_user(dir: impl AsRef<Path>, user_id: &str) -> Result<Self> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(BridgeError::InvalidInput(
                "A user id is required for per-user bridge storage".to_string(),
            ));
        }
        if !user_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(BridgeError::InvalidInput(format!(
                "User id contains unsupported characters: {}",
                user_id
            )));
        }
        let filename = format!("{}{}{}", USER_FILENAME_PREFIX, user_id, USER_FILENAME_SUFFIX);
        Ok(Self::new(dir.as_ref().join(filename)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EnvelopeStore for FileEnvelopeStore {
    fn load(&self) -> Result<Option<EncryptedBridgeEnvelope>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(BridgeError::Storage(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    err
                )))
            }
        };
        envelope::from_json(&text).map(Some)
    }

    fn save(&self, envelope: &EncryptedBridgeEnvelope) -> Result<()> {
        let json = envelope::to_json(envelope)?;
        crate::fs::write_atomic(&self.path, json.as_bytes()).map_err(|e| {
            BridgeError::Storage(format!("Failed to write {}: {}", self.path.display(), e))
        })?;
        tracing::debug!(path = %self.path.display(), "bridge envelope written");
        Ok(())
    }

    fn exists(&self) -> Result<bool> {
        Ok(self.path.is_file())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::BridgePayload;
    use crate::crypto::MIN_ITERATIONS;
    use tempfile::tempdir;

    fn sample_envelope() -> EncryptedBridgeEnvelope {
        envelope::serialize_with_iterations(
            &BridgePayload::default(),
            "test-passphrase-secure-123",
            MIN_ITERATIONS,
        )
        .unwrap()
    }

    #[test]
    fn test_missing_file_loads_none() {
        let dir = tempdir().unwrap();
        let store = FileEnvelopeStore::new(dir.path().join(DEFAULT_BRIDGE_FILENAME));
        assert!(store.load().unwrap().is_none());
        assert!(!store.exists().unwrap());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let store = FileEnvelopeStore::new(dir.path().join(DEFAULT_BRIDGE_FILENAME));
        let envelope = sample_envelope();

        store.save(&envelope).unwrap();

        assert!(store.exists().unwrap());
        assert_eq!(store.load().unwrap(), Some(envelope));
    }

    #[test]
    fn test_save_replaces_previous_envelope() {
        let dir = tempdir().unwrap();
        let store = FileEnvelopeStore::new(dir.path().join(DEFAULT_BRIDGE_FILENAME));
        let first = sample_envelope();
        let second = sample_envelope();

        store.save(&first).unwrap();
        store.save(&second).unwrap();

        assert_eq!(store.load().unwrap(), Some(second));
    }

    #[test]
    fn test_save_into_missing_directory_fails_cleanly() {
        let dir = tempdir().unwrap();
        let store = FileEnvelopeStore::new(dir.path().join("nope").join("bridge.json"));
        assert!(matches!(
            store.save(&sample_envelope()),
            Err(BridgeError::Storage(_))
        ));
    }

    #[test]
    fn test_garbage_file_is_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(DEFAULT_BRIDGE_FILENAME);
        fs::write(&path, "not json").unwrap();
        let store = FileEnvelopeStore::new(path);
        assert!(matches!(store.load(), Err(BridgeError::CorruptEnvelope(_))));
    }

    #[test]
    fn test_for_user_scopes_filename() {
        let dir = tempdir().unwrap();
        let alice = FileEnvelopeStore::for_user(dir.path(), "user-1").unwrap();
        let bob = FileEnvelopeStore::for_user(dir.path(), "user-2").unwrap();

        assert_ne!(alice.path(), bob.path());
        assert!(alice
            .path()
            .ends_with("encrypted-bridge-user-user-1.bridge.json.enc"));
    }

    #[test]
    fn test_for_user_rejects_empty_or_path_like_ids() {
        let dir = tempdir().unwrap();
        assert!(FileEnvelopeStore::for_user(dir.path(), "  ").is_err());
        assert!(FileEnvelopeStore::for_user(dir.path(), "../other").is_err());
    }
}
