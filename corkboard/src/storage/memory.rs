//! In-memory storage backend
//!
//! Backs tests and embedded deployments. Deliberately mirrors the external
//! managed store's behavior: no uniqueness constraint on the unordered pair,
//! no multi-statement atomicity across calls.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::storage::errors::StorageError;
use crate::storage::filters::{EdgePredicate, EdgeRole};
use crate::storage::models::{ContentItem, FriendRequest, NewFriendRequest, RequestStatus};
use crate::storage::traits::{ContentStore, RelationshipStore};

/// In-memory table of friend-request edges
#[derive(Debug, Default)]
pub struct MemoryStore {
    edges: RwLock<HashMap<String, FriendRequest>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fully-formed edge, preserving its id and timestamps. Used to
    /// seed histories (duplicate rows, explicit `created_at` ordering) that
    /// the resolution policy must tolerate.
    pub async fn insert_raw(&self, edge: FriendRequest) {
        self.edges.write().await.insert(edge.id.clone(), edge);
    }

    /// Number of edges currently stored
    pub async fn edge_count(&self) -> usize {
        self.edges.read().await.len()
    }
}

#[async_trait]
impl RelationshipStore for MemoryStore {
    async fn insert(&self, edge: NewFriendRequest) -> Result<FriendRequest, StorageError> {
        let row = FriendRequest {
            id: Uuid::new_v4().to_string(),
            requester_id: edge.requester_id,
            recipient_id: edge.recipient_id,
            status: RequestStatus::Pending,
            created_at: Utc::now(),
            responded_at: None,
            seen_at: None,
        };
        self.edges.write().await.insert(row.id.clone(), row.clone());
        Ok(row)
    }

    async fn get(&self, id: &str) -> Result<Option<FriendRequest>, StorageError> {
        Ok(self.edges.read().await.get(id).cloned())
    }

    async fn update_status_if(
        &self,
        id: &str,
        expected_status: RequestStatus,
        new_status: RequestStatus,
        expected_recipient: &str,
    ) -> Result<u64, StorageError> {
        let mut edges = self.edges.write().await;
        match edges.get_mut(id) {
            Some(edge)
                if edge.status == expected_status && edge.recipient_id == expected_recipient =>
            {
                edge.status = new_status;
                if new_status != RequestStatus::Pending {
                    let now = Utc::now();
                    edge.responded_at = Some(now);
                    edge.seen_at = Some(now);
                }
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn mark_seen(&self, id: &str, expected_recipient: &str) -> Result<u64, StorageError> {
        let mut edges = self.edges.write().await;
        match edges.get_mut(id) {
            Some(edge) if edge.recipient_id == expected_recipient => {
                edge.seen_at = Some(Utc::now());
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn delete_where(&self, predicate: EdgePredicate) -> Result<u64, StorageError> {
        let mut edges = self.edges.write().await;
        let before = edges.len();
        edges.retain(|_, edge| !predicate.matches(edge));
        Ok((before - edges.len()) as u64)
    }

    async fn query_pair(
        &self,
        requester: &str,
        recipient: &str,
        limit: usize,
    ) -> Result<Vec<FriendRequest>, StorageError> {
        let edges = self.edges.read().await;
        let mut rows: Vec<FriendRequest> = edges
            .values()
            .filter(|edge| edge.requester_id == requester && edge.recipient_id == recipient)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(limit);
        Ok(rows)
    }

    async fn query_edges_touching_any(
        &self,
        user_ids: &[String],
        role: EdgeRole,
        status: RequestStatus,
    ) -> Result<Vec<FriendRequest>, StorageError> {
        let edges = self.edges.read().await;
        let mut rows: Vec<FriendRequest> = edges
            .values()
            .filter(|edge| {
                let side = match role {
                    EdgeRole::Requester => &edge.requester_id,
                    EdgeRole::Recipient => &edge.recipient_id,
                };
                edge.status == status && user_ids.contains(side)
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }
}

/// In-memory content table
#[derive(Debug, Default)]
pub struct MemoryContentStore {
    items: RwLock<Vec<ContentItem>>,
}

impl MemoryContentStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a content item
    pub async fn add(&self, item: ContentItem) {
        self.items.write().await.push(item);
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn list_recent(&self, limit: usize) -> Result<Vec<ContentItem>, StorageError> {
        let items = self.items.read().await;
        let mut rows: Vec<ContentItem> = items.iter().cloned().collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(limit);
        Ok(rows)
    }

    async fn list_by_owner(
        &self,
        owner_id: &str,
        limit: usize,
    ) -> Result<Vec<ContentItem>, StorageError> {
        let items = self.items.read().await;
        let mut rows: Vec<ContentItem> = items
            .iter()
            .filter(|item| item.owner_id == owner_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(limit);
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_edge(requester: &str, recipient: &str) -> NewFriendRequest {
        NewFriendRequest {
            requester_id: requester.to_string(),
            recipient_id: recipient.to_string(),
        }
    }

    #[tokio::test]
    async fn insert_assigns_id_and_pending_status() {
        let store = MemoryStore::new();
        let row = store.insert(new_edge("alice", "bob")).await.unwrap();
        assert_eq!(row.status, RequestStatus::Pending);
        assert!(row.responded_at.is_none());

        let fetched = store.get(&row.id).await.unwrap().unwrap();
        assert_eq!(fetched, row);
    }

    #[tokio::test]
    async fn guarded_update_rejects_wrong_recipient() {
        let store = MemoryStore::new();
        let row = store.insert(new_edge("alice", "bob")).await.unwrap();

        let affected = store
            .update_status_if(
                &row.id,
                RequestStatus::Pending,
                RequestStatus::Accepted,
                "carol",
            )
            .await
            .unwrap();
        assert_eq!(affected, 0);

        let affected = store
            .update_status_if(
                &row.id,
                RequestStatus::Pending,
                RequestStatus::Accepted,
                "bob",
            )
            .await
            .unwrap();
        assert_eq!(affected, 1);

        let accepted = store.get(&row.id).await.unwrap().unwrap();
        assert_eq!(accepted.status, RequestStatus::Accepted);
        assert!(accepted.responded_at.is_some());
        assert!(accepted.seen_at.is_some());
    }

    #[tokio::test]
    async fn guarded_update_rejects_non_pending_row() {
        let store = MemoryStore::new();
        let row = store.insert(new_edge("alice", "bob")).await.unwrap();
        store
            .update_status_if(
                &row.id,
                RequestStatus::Pending,
                RequestStatus::Declined,
                "bob",
            )
            .await
            .unwrap();

        let affected = store
            .update_status_if(
                &row.id,
                RequestStatus::Pending,
                RequestStatus::Accepted,
                "bob",
            )
            .await
            .unwrap();
        assert_eq!(affected, 0);
    }

    #[tokio::test]
    async fn delete_where_removes_only_matching_direction() {
        let store = MemoryStore::new();
        store.insert(new_edge("alice", "bob")).await.unwrap();
        store.insert(new_edge("bob", "alice")).await.unwrap();

        let removed = store
            .delete_where(EdgePredicate::directed(
                "alice",
                "bob",
                &[RequestStatus::Pending],
            ))
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.edge_count().await, 1);
    }

    #[tokio::test]
    async fn query_pair_orders_newest_first_and_limits() {
        let store = MemoryStore::new();
        for _ in 0..4 {
            store.insert(new_edge("alice", "bob")).await.unwrap();
        }

        let rows = store.query_pair("alice", "bob", 3).await.unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }
}
