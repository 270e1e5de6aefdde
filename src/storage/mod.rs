//! Key-value storage adapters. The persistence engine is the only component
//! that talks to a store directly.

pub mod file_backend;
pub mod memory;

use thiserror::Error;

pub use file_backend::FileStore;
pub use memory::MemoryStore;

/// Failures a store can report. Quota exhaustion is the only kind the
/// persistence engine recovers from locally.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage quota exceeded writing `{key}`: {needed} bytes needed, {available} available")]
    QuotaExceeded {
        key: String,
        needed: usize,
        available: usize,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    pub fn is_quota(&self) -> bool {
        matches!(self, StorageError::QuotaExceeded { .. })
    }
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// String-keyed durable store. A successful `set` is visible to every later
/// `get` on the same store.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
    fn remove(&self, key: &str) -> StorageResult<()>;
    fn keys(&self) -> StorageResult<Vec<String>>;

    fn contains(&self, key: &str) -> StorageResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}

/// Bytes a stored entry is charged against a quota.
pub(crate) fn entry_cost(key: &str, value: &str) -> usize {
    key.len() + value.len()
}
