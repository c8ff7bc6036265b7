//! Persistence module for last-known values and sample history
//!
//! Provides whole-file atomic replacement for state records and
//! append-only writes for history logs.

pub mod file;

pub use file::FileBackend;

use std::path::{Path, PathBuf};

/// Trait for persistence backends
pub trait PersistenceBackend: Send + Sync {
    /// Replace the data stored under `key`. Readers see either the old or the
    /// new contents, never a mix.
    fn write(&self, key: &str, data: &[u8]) -> Result<(), PersistenceError>;

    /// Read data from persistence
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError>;

    /// Append one record to the data stored under `key`
    fn append(&self, key: &str, record: &[u8]) -> Result<(), PersistenceError>;
}

/// Persistence configuration
#[derive(Debug, Clone)]
pub struct PersistenceConfig {
    /// Base directory for state and history files
    pub data_dir: PathBuf,
    /// Whether to fsync after every write
    pub sync_writes: bool,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./pricewatch_data"),
            sync_writes: true,
        }
    }
}

impl PersistenceConfig {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    pub fn with_sync_writes(mut self, enabled: bool) -> Self {
        self.sync_writes = enabled;
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Corrupted data in {key}: {reason}")]
    Corrupted { key: String, reason: String },
}
