//! Storage abstraction for bridge envelopes.
//!
//! Only the encrypted envelope is ever persisted. Backends implement
//! [`EnvelopeStore`]:
//! - [`FileEnvelopeStore`]: JSON file, replaced atomically on save
//! - [`MemoryEnvelopeStore`]: in-process, for embedding and tests

pub mod file;
pub mod memory;
pub mod traits;

pub use file::{FileEnvelopeStore, DEFAULT_BRIDGE_FILENAME};
pub use memory::MemoryEnvelopeStore;
pub use traits::EnvelopeStore;
