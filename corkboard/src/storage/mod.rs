//! Storage abstractions and implementations
//!
//! This module provides the repository interfaces the relationship engine
//! consumes and the in-memory backend that implements them.
//!
//! ## Storage Implementations
//!
//! - **Memory**: in-process storage for testing and embedded deployments.
//!   The managed external backend of a production deployment implements the
//!   same traits; see `traits` for the contract it must uphold.

pub mod errors;
pub mod filters;
pub mod memory;
pub mod models;
pub mod traits;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{CorkboardConfig, StoreBackend};
use errors::StorageError;
use memory::{MemoryContentStore, MemoryStore};
use traits::{ContentStore, RelationshipStore};

/// Bound a store call to `deadline`. A timeout is surfaced as a
/// [`StorageError::Timeout`] and never retried here; retry policy belongs to
/// the caller.
pub async fn bounded<T>(
    deadline: Duration,
    fut: impl Future<Output = Result<T, StorageError>>,
) -> Result<T, StorageError> {
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => Err(StorageError::Timeout(format!(
            "store call exceeded {}ms",
            deadline.as_millis()
        ))),
    }
}

/// Create the relationship store selected by the configuration
pub fn create_relationship_store(config: &CorkboardConfig) -> Arc<dyn RelationshipStore> {
    match config.store.backend {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
    }
}

/// Create the content store selected by the configuration
pub fn create_content_store(config: &CorkboardConfig) -> Arc<dyn ContentStore> {
    match config.store.backend {
        StoreBackend::Memory => Arc::new(MemoryContentStore::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn bounded_surfaces_timeout_as_store_failure() {
        let result: Result<(), StorageError> = bounded(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

        assert!(matches!(result, Err(StorageError::Timeout(_))));
    }

    #[tokio::test]
    async fn bounded_passes_through_completed_calls() {
        let result = bounded(Duration::from_secs(1), async { Ok(7u64) }).await;
        assert_eq!(result.unwrap(), 7);
    }
}
