//! Durable key-value medium behind the engine's stores
//!
//! The engine treats storage as a plain keyed blob sink: every mutation
//! re-serializes and writes the whole affected store, so readers always see
//! one consistent snapshot per key.

use thiserror::Error;

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Blob key for the serialized defaults record
pub const DEFAULTS_KEY: &str = "uncertainty.defaults.v1";

/// Blob key for the serialized assessment-key → record map
pub const STATE_MAP_KEY: &str = "uncertainty.state.map.v1";

/// Pre-map single-record blob; read once at startup, never written again
pub const LEGACY_STATE_KEY: &str = "uncertainty.state.v1";

/// A durable key-value sink for serialized store snapshots
pub trait StorageMedium {
    /// Read the blob stored under `key`, if any
    fn read(&self, key: &str) -> Option<String>;

    /// Write `value` under `key`, replacing any previous blob
    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Errors a storage medium can report on write
///
/// The engine swallows these (best-effort persistence); they exist so
/// media implementations and tests can still observe failures.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage medium is read-only")]
    ReadOnly,
}
