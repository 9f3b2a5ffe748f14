//! The identity bridge: roster model, edits, and the lock/unlock lifecycle.

pub mod import;
pub mod manager;
mod roster;
pub mod types;

pub use import::import_csv;
pub use manager::{BridgeManager, BridgeSettings, BridgeState};
pub use types::{
    BridgePayload, BridgeProfile, ImportResult, ImportRowError, NewStudent, RosterEntry,
    StudentId, StudentUpdate,
};
