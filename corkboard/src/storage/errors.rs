//! Error types for storage operations

use thiserror::Error;

/// Error type for relationship and content store operations
#[derive(Debug, Error)]
pub enum StorageError {
    /// Connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query error
    #[error("Query error: {0}")]
    Query(String),

    /// Operation error
    #[error("Operation error: {0}")]
    Operation(String),

    /// Data not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// The store's row-level policy rejected a mutation the caller was
    /// otherwise entitled to (e.g. updating a terminal row). Callers inspect
    /// this variant separately from generic failures.
    #[error("Permission denied by store policy: {0}")]
    PermissionDenied(String),

    /// Store call exceeded its deadline
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Convert a JSON error to a storage error
impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}
