//! Trait definitions for storage collaborators
//!
//! The relationship engine consumes a narrow repository interface over the
//! external store; these traits are the swap point for a managed backend.
//! The bundled [`MemoryStore`](crate::storage::memory::MemoryStore)
//! implementation backs tests and embedded deployments.

use std::fmt::Debug;

use async_trait::async_trait;

use crate::storage::errors::StorageError;
use crate::storage::filters::{EdgePredicate, EdgeRole};
use crate::storage::models::{ContentItem, FriendRequest, NewFriendRequest, RequestStatus};

/// Durable table of directed friend-request edges.
///
/// The engine assumes no multi-statement atomicity from implementations:
/// each method is an independent operation, and concurrent callers may
/// interleave between calls. Implementations backed by a store that can
/// enforce a canonicalized unordered-pair uniqueness key should do so in
/// `insert`; the engine's read-time resolution tolerates duplicates either
/// way.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RelationshipStore: Send + Sync + Debug + 'static {
    /// Insert a fresh `pending` edge, returning the stored row
    async fn insert(&self, edge: NewFriendRequest) -> Result<FriendRequest, StorageError>;

    /// Get an edge by its id
    async fn get(&self, id: &str) -> Result<Option<FriendRequest>, StorageError>;

    /// Transition an edge's status, guarded by its current status and its
    /// recipient. Returns the number of rows affected; 0 means the guard did
    /// not hold (the row changed or never matched). Transitions out of
    /// `pending` stamp `responded_at` and `seen_at`.
    async fn update_status_if(
        &self,
        id: &str,
        expected_status: RequestStatus,
        new_status: RequestStatus,
        expected_recipient: &str,
    ) -> Result<u64, StorageError>;

    /// Stamp `seen_at` on an edge addressed to `expected_recipient`.
    /// Returns the number of rows affected.
    async fn mark_seen(&self, id: &str, expected_recipient: &str) -> Result<u64, StorageError>;

    /// Delete every edge matching the predicate, returning the count.
    /// Deleting an already-deleted row is a no-op, so retrying a failed
    /// multi-delete is safe.
    async fn delete_where(&self, predicate: EdgePredicate) -> Result<u64, StorageError>;

    /// The most recent edges from `requester` to `recipient`, ordered by
    /// `created_at` descending, at most `limit` rows
    async fn query_pair(
        &self,
        requester: &str,
        recipient: &str,
        limit: usize,
    ) -> Result<Vec<FriendRequest>, StorageError>;

    /// Every edge in `status` where the user on `role`'s side is one of
    /// `user_ids`. Used for friend-set and friends-of-friends expansion.
    async fn query_edges_touching_any(
        &self,
        user_ids: &[String],
        role: EdgeRole,
        status: RequestStatus,
    ) -> Result<Vec<FriendRequest>, StorageError>;
}

/// Read-only view of the external content store; only `owner_id` and
/// `privacy_tier` are consumed here.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentStore: Send + Sync + Debug + 'static {
    /// The most recent content items across all owners, newest first
    async fn list_recent(&self, limit: usize) -> Result<Vec<ContentItem>, StorageError>;

    /// The most recent content items for one owner, newest first
    async fn list_by_owner(
        &self,
        owner_id: &str,
        limit: usize,
    ) -> Result<Vec<ContentItem>, StorageError>;
}
