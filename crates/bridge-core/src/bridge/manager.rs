//! Bridge lifecycle: Locked -> Unlocking -> Unlocked -> Locked.
//!
//! A [`BridgeManager`] is an explicit handle, cloned cheaply and passed to
//! whoever needs roster access. The decrypted payload and the passphrase live
//! only inside the `Unlocked` phase and are dropped on [`BridgeManager::lock`].
//!
//! Key derivation and store I/O run on tokio's blocking pool. The state mutex
//! is never held across an `.await`.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use secrecy::{ExposeSecret, SecretString};

use super::import;
use super::types::{
    BridgePayload, BridgeProfile, ImportResult, NewStudent, RosterEntry, StudentId, StudentUpdate,
};
use crate::crypto::{passphrases_match, validate_passphrase, DEFAULT_ITERATIONS, MIN_ITERATIONS};
use crate::envelope::{self, EncryptedBridgeEnvelope};
use crate::error::{BridgeError, Result};
use crate::storage::EnvelopeStore;

/// Tunables for sealing new envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeSettings {
    /// PBKDF2 iterations recorded in every envelope this manager writes
    pub iterations: u32,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

impl BridgeSettings {
    /// Settings with a custom iteration count, validated against the floor.
    pub fn with_iterations(iterations: u32) -> Result<Self> {
        if iterations < MIN_ITERATIONS {
            return Err(BridgeError::InvalidInput(format!(
                "KDF iterations must be at least {}",
                MIN_ITERATIONS
            )));
        }
        Ok(Self { iterations })
    }
}

/// Observable lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    Locked,
    Unlocking,
    Unlocked,
}

impl fmt::Display for BridgeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BridgeState::Locked => write!(f, "locked"),
            BridgeState::Unlocking => write!(f, "unlocking"),
            BridgeState::Unlocked => write!(f, "unlocked"),
        }
    }
}

struct Session {
    payload: BridgePayload,
    passphrase: SecretString,
}

enum Phase {
    Locked,
    Unlocking,
    Unlocked(Session),
}

struct State {
    /// Bumped on every lock so a late unlock result can tell it was cancelled.
    generation: u64,
    phase: Phase,
}

struct Inner {
    store: Arc<dyn EnvelopeStore>,
    settings: BridgeSettings,
    state: Mutex<State>,
    save_gate: tokio::sync::Mutex<()>,
}

/// Shared handle to one bridge.
#[derive(Clone)]
pub struct BridgeManager {
    inner: Arc<Inner>,
}

impl fmt::Debug for BridgeManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeManager")
            .field("store", &self.inner.store.location())
            .field("state", &self.state())
            .finish()
    }
}

fn copy_secret(secret: &SecretString) -> SecretString {
    SecretString::from(secret.expose_secret().to_owned())
}

/// Puts an abandoned `Unlocking` phase back to `Locked` when the unlock
/// future is dropped before it finishes.
struct UnlockAttempt<'a> {
    manager: &'a BridgeManager,
    generation: u64,
    armed: bool,
}

impl<'a> UnlockAttempt<'a> {
    fn new(manager: &'a BridgeManager, generation: u64) -> Self {
        Self {
            manager,
            generation,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for UnlockAttempt<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.manager.state_guard();
        if state.generation == self.generation && matches!(state.phase, Phase::Unlocking) {
            state.phase = Phase::Locked;
            tracing::debug!("unlock abandoned; bridge left locked");
        }
    }
}

fn open_from_store(store: &dyn EnvelopeStore, passphrase: &str) -> Result<BridgePayload> {
    let envelope = store.load()?.ok_or(BridgeError::BridgeNotFound)?;
    envelope::deserialize(&envelope, passphrase)
}

impl BridgeManager {
    pub fn new(store: Arc<dyn EnvelopeStore>) -> Self {
        Self::with_settings(store, BridgeSettings::default())
    }

    pub fn with_settings(store: Arc<dyn EnvelopeStore>, settings: BridgeSettings) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                settings,
                state: Mutex::new(State {
                    generation: 0,
                    phase: Phase::Locked,
                }),
                save_gate: tokio::sync::Mutex::new(()),
            }),
        }
    }

    // Poisoning is ignored: `lock` must always be able to drop the session.
    fn state_guard(&self) -> MutexGuard<'_, State> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn with_session<R>(&self, f: impl FnOnce(&Session) -> R) -> Option<R> {
        match &self.state_guard().phase {
            Phase::Unlocked(session) => Some(f(session)),
            _ => None,
        }
    }

    fn with_payload_mut<R>(&self, f: impl FnOnce(&mut BridgePayload) -> Result<R>) -> Result<R> {
        match &mut self.state_guard().phase {
            Phase::Unlocked(session) => f(&mut session.payload),
            _ => Err(BridgeError::Locked),
        }
    }

    /// Where the envelope is persisted.
    pub fn location(&self) -> String {
        self.inner.store.location()
    }

    pub fn settings(&self) -> BridgeSettings {
        self.inner.settings
    }

    pub fn state(&self) -> BridgeState {
        match self.state_guard().phase {
            Phase::Locked => BridgeState::Locked,
            Phase::Unlocking => BridgeState::Unlocking,
            Phase::Unlocked(_) => BridgeState::Unlocked,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.state() != BridgeState::Unlocked
    }

    /// Open the stored envelope.
    ///
    /// Every failure other than a missing envelope is reported as
    /// [`BridgeError::UnlockFailed`]; the specific cause only reaches the log.
    /// If [`lock`](Self::lock) is called while this is running, the result is
    /// discarded and `Locked` is returned. Dropping the future before it
    /// completes leaves the bridge `Locked`.
    pub async fn unlock(&self, passphrase: SecretString) -> Result<()> {
        let generation = {
            let mut state = self.state_guard();
            match state.phase {
                Phase::Unlocking => return Err(BridgeError::ConcurrentUnlockRejected),
                Phase::Unlocked(_) => return Err(BridgeError::AlreadyUnlocked),
                Phase::Locked => {
                    state.phase = Phase::Unlocking;
                    state.generation
                }
            }
        };
        tracing::debug!(location = %self.location(), "unlocking bridge");
        let attempt = UnlockAttempt::new(self, generation);

        let store = Arc::clone(&self.inner.store);
        let secret = copy_secret(&passphrase);
        let outcome = tokio::task::spawn_blocking(move || {
            open_from_store(store.as_ref(), secret.expose_secret())
        })
        .await
        .unwrap_or_else(|e| Err(BridgeError::Crypto(format!("Unlock task failed: {}", e))));
        // No await points below; the phase is settled here.
        attempt.disarm();

        let mut state = self.state_guard();
        if state.generation != generation {
            tracing::info!("bridge locked during unlock; result discarded");
            return Err(BridgeError::Locked);
        }

        match outcome {
            Ok(payload) => {
                tracing::info!(entries = payload.roster.len(), "bridge unlocked");
                state.phase = Phase::Unlocked(Session {
                    payload,
                    passphrase,
                });
                Ok(())
            }
            Err(BridgeError::BridgeNotFound) => {
                state.phase = Phase::Locked;
                tracing::warn!(location = %self.location(), "no bridge to unlock");
                Err(BridgeError::BridgeNotFound)
            }
            Err(err) => {
                state.phase = Phase::Locked;
                tracing::warn!(cause = err.cause_label(), "bridge unlock failed");
                Err(BridgeError::UnlockFailed)
            }
        }
    }

    /// Drop the decrypted roster and passphrase. Unsaved edits are lost.
    pub fn lock(&self) {
        let mut state = self.state_guard();
        state.generation = state.generation.wrapping_add(1);
        let was = std::mem::replace(&mut state.phase, Phase::Locked);
        drop(state);
        if !matches!(was, Phase::Locked) {
            tracing::info!("bridge locked");
        }
    }

    /// Start a new, empty bridge and leave it unlocked.
    ///
    /// Refuses to run when the store already holds an envelope. Nothing is
    /// written until [`save`](Self::save).
    pub fn create_new(&self, passphrase: SecretString, profile: BridgeProfile) -> Result<()> {
        validate_passphrase(passphrase.expose_secret())?;
        if self.inner.store.exists()? {
            return Err(BridgeError::InvalidInput(format!(
                "A bridge already exists at {}",
                self.location()
            )));
        }

        let mut state = self.state_guard();
        match state.phase {
            Phase::Unlocking => Err(BridgeError::ConcurrentUnlockRejected),
            Phase::Unlocked(_) => Err(BridgeError::AlreadyUnlocked),
            Phase::Locked => {
                state.phase = Phase::Unlocked(Session {
                    payload: BridgePayload::new(profile),
                    passphrase,
                });
                tracing::info!("new bridge created");
                Ok(())
            }
        }
    }

    /// Seal a snapshot of the current roster and replace the stored envelope.
    ///
    /// Saves run one at a time and each takes its snapshot only after the
    /// previous one finished, so an older roster never overwrites a newer one.
    /// On failure the in-memory roster is kept and `SaveFailed` is returned.
    pub async fn save(&self) -> Result<()> {
        let _gate = self.inner.save_gate.lock().await;

        let (payload, passphrase) = self
            .with_session(|s| (s.payload.clone(), copy_secret(&s.passphrase)))
            .ok_or(BridgeError::Locked)?;
        let entries = payload.roster.len();
        let store = Arc::clone(&self.inner.store);
        let iterations = self.inner.settings.iterations;

        let result = tokio::task::spawn_blocking(move || {
            let sealed =
                envelope::serialize_with_iterations(&payload, passphrase.expose_secret(), iterations)?;
            store.save(&sealed)
        })
        .await
        .unwrap_or_else(|e| Err(BridgeError::Storage(format!("Save task failed: {}", e))));

        match result {
            Ok(()) => {
                tracing::info!(entries, location = %self.location(), "bridge saved");
                Ok(())
            }
            Err(err) => {
                tracing::error!(cause = err.cause_label(), "bridge save failed");
                Err(BridgeError::SaveFailed(err.to_string()))
            }
        }
    }

    /// Seal the current roster without touching the store, for an explicit
    /// user-initiated export.
    pub async fn export_envelope(&self) -> Result<EncryptedBridgeEnvelope> {
        let (payload, passphrase) = self
            .with_session(|s| (s.payload.clone(), copy_secret(&s.passphrase)))
            .ok_or(BridgeError::Locked)?;
        let iterations = self.inner.settings.iterations;

        tokio::task::spawn_blocking(move || {
            envelope::serialize_with_iterations(&payload, passphrase.expose_secret(), iterations)
        })
        .await
        .unwrap_or_else(|e| Err(BridgeError::Crypto(format!("Export task failed: {}", e))))
    }

    /// Replace the passphrase. Takes effect at the next [`save`](Self::save).
    pub fn rotate_passphrase(&self, current: &SecretString, new: SecretString) -> Result<()> {
        validate_passphrase(new.expose_secret())?;
        match &mut self.state_guard().phase {
            Phase::Unlocked(session) => {
                let current = current.expose_secret();
                if !passphrases_match(session.passphrase.expose_secret(), current) {
                    return Err(BridgeError::WrongPassphrase);
                }
                session.passphrase = new;
                tracing::info!("bridge passphrase rotated; pending save");
                Ok(())
            }
            _ => Err(BridgeError::Locked),
        }
    }

    // Reads return empty results while locked.

    pub fn roster(&self) -> Vec<RosterEntry> {
        self.with_session(|s| s.payload.roster.clone())
            .unwrap_or_default()
    }

    pub fn class_periods(&self) -> Vec<String> {
        self.with_session(|s| s.payload.class_periods.clone())
            .unwrap_or_default()
    }

    pub fn profile(&self) -> Option<BridgeProfile> {
        self.with_session(|s| s.payload.profile())
    }

    pub fn find_by_uuid(&self, id: &StudentId) -> Option<RosterEntry> {
        self.with_session(|s| s.payload.find_by_uuid(id).cloned())
            .flatten()
    }

    pub fn find_by_local_id(&self, local_id: &str) -> Option<RosterEntry> {
        self.with_session(|s| s.payload.find_by_local_id(local_id).cloned())
            .flatten()
    }

    pub fn find_by_name(&self, query: &str) -> Vec<RosterEntry> {
        self.with_session(|s| {
            s.payload
                .find_by_name(query)
                .into_iter()
                .cloned()
                .collect()
        })
        .unwrap_or_default()
    }

    // Edits touch memory only; call `save` to persist.

    pub fn add(&self, student: NewStudent) -> Result<RosterEntry> {
        self.with_payload_mut(|payload| payload.add_student(student))
    }

    pub fn update(&self, id: &StudentId, update: StudentUpdate) -> Result<RosterEntry> {
        self.with_payload_mut(|payload| payload.update_student(id, update))
    }

    pub fn remove(&self, id: &StudentId) -> Result<RosterEntry> {
        self.with_payload_mut(|payload| payload.remove_student(id))
    }

    pub fn import_csv(&self, csv_text: &str) -> Result<ImportResult> {
        self.with_payload_mut(|payload| Ok(import::import_csv(payload, csv_text)))
    }

    pub fn set_class_periods(&self, periods: Vec<String>) -> Result<()> {
        self.with_payload_mut(|payload| {
            payload.set_class_periods(periods);
            Ok(())
        })
    }
}
