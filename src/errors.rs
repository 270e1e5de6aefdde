use thiserror::Error;

use crate::storage::StorageError;

pub type Result<T> = std::result::Result<T, TrackerError>;

/// Failures surfaced by the tracker core. Every variant leaves the in-memory
/// model in its last known good state.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Document is not well-formed JSON: {0}")]
    ParseFailure(String),
    #[error("Invalid document format: {0}")]
    InvalidFormat(String),
    #[error("A category named `{0}` already exists")]
    DuplicateName(String),
    #[error("`{0}` is already a built-in category")]
    ReservedName(String),
    #[error("Invalid category name `{0}`: at least 2 characters are required")]
    InvalidName(String),
    #[error("Category `{name}` is used by {bills} bill(s)")]
    InUse { name: String, bills: usize },
    #[error("`{0}` is not a built-in category")]
    UnknownBuiltin(String),
    #[error("Category not found at index {0}")]
    CategoryNotFound(usize),
    #[error("Bill not found at index {0}")]
    BillNotFound(usize),
    #[error("Invalid bill: {0}")]
    InvalidBill(String),
    #[error("Could not encode data for storage: {0}")]
    Encode(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TrackerError {
    /// Validation failures are rejected before any mutation is applied.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            TrackerError::DuplicateName(_)
                | TrackerError::ReservedName(_)
                | TrackerError::InvalidName(_)
                | TrackerError::InUse { .. }
                | TrackerError::UnknownBuiltin(_)
                | TrackerError::InvalidBill(_)
        )
    }
}

impl From<crate::config::ConfigError> for TrackerError {
    fn from(err: crate::config::ConfigError) -> Self {
        TrackerError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for TrackerError {
    fn from(err: serde_json::Error) -> Self {
        TrackerError::ParseFailure(err.to_string())
    }
}
