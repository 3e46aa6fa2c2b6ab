//! Write transitions of a relationship edge
//!
//! All mutations of the friend-request table flow through
//! [`FriendRequestStateMachine`]: sending a request (with auto-accept when
//! the reverse direction already holds one), declining, marking seen, and
//! the delete/cancel/unfriend family. The store offers no multi-statement
//! atomicity, so every path is written to be safe to retry and to tolerate
//! concurrent interleavings; see `resolution` for how readers collapse the
//! resulting row histories.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::relationships::resolution::{DIRECTION_HISTORY_LIMIT, resolve};
use crate::relationships::types::RequestOutcome;
use crate::storage::bounded;
use crate::storage::errors::StorageError;
use crate::storage::filters::EdgePredicate;
use crate::storage::models::{NewFriendRequest, RequestStatus};
use crate::storage::traits::RelationshipStore;
use crate::{CorkboardError, Result};

/// Statuses that constitute a live edge for cleanup and unfriend deletes
const LIVE_STATUSES: [RequestStatus; 2] = [RequestStatus::Pending, RequestStatus::Accepted];

/// Owns all write transitions of friend-request edges
#[derive(Debug)]
pub struct FriendRequestStateMachine {
    store: Arc<dyn RelationshipStore>,
    op_timeout: Duration,
}

impl FriendRequestStateMachine {
    /// Create a new state machine over the given store. Every store call is
    /// bounded by `op_timeout`.
    pub fn new(store: Arc<dyn RelationshipStore>, op_timeout: Duration) -> Self {
        Self { store, op_timeout }
    }

    /// Send a friend request from `requester` to `recipient`.
    ///
    /// If the reverse direction already holds a `pending` request this is an
    /// auto-accept of that request. If the forward direction already holds a
    /// live row the call is idempotent and returns it. A `declined` forward
    /// history is recreated rather than revived: the store's access policy
    /// forbids updating terminal rows, so the declined rows are deleted and a
    /// fresh `pending` row inserted.
    pub async fn request_friendship(
        &self,
        requester: &str,
        recipient: &str,
    ) -> Result<RequestOutcome> {
        validate_pair(requester, recipient)?;

        let reverse_rows = bounded(
            self.op_timeout,
            self.store
                .query_pair(recipient, requester, DIRECTION_HISTORY_LIMIT),
        )
        .await?;

        if let Some(reverse) = resolve(&reverse_rows) {
            match reverse.status {
                RequestStatus::Accepted | RequestStatus::Pending => {
                    return self.auto_accept(requester, recipient, reverse).await;
                }
                RequestStatus::Declined => {}
            }
        }

        let forward_rows = bounded(
            self.op_timeout,
            self.store
                .query_pair(requester, recipient, DIRECTION_HISTORY_LIMIT),
        )
        .await?;

        match resolve(&forward_rows) {
            Some(forward) if forward.status != RequestStatus::Declined => {
                // Duplicate send collapses to the existing row
                debug!(
                    requester,
                    recipient,
                    request_id = %forward.id,
                    status = %forward.status,
                    "request already exists"
                );
                Ok(RequestOutcome::new(forward.status, &forward.id))
            }
            Some(_) => {
                // Terminal rows cannot be updated by the requester; delete the
                // declined history and start over with a fresh row.
                bounded(
                    self.op_timeout,
                    self.store.delete_where(EdgePredicate::directed(
                        requester,
                        recipient,
                        &[RequestStatus::Declined],
                    )),
                )
                .await
                .map_err(|e| policy_or_store(e, "cannot clear declined request"))?;

                self.insert_pending(requester, recipient).await
            }
            None => self.insert_pending(requester, recipient).await,
        }
    }

    /// Accept the reverse request, then clean up any stray live rows in the
    /// forward direction. An already-accepted reverse row skips the guarded
    /// transition but still resolves to the same outcome.
    async fn auto_accept(
        &self,
        requester: &str,
        recipient: &str,
        reverse: &crate::storage::models::FriendRequest,
    ) -> Result<RequestOutcome> {
        if reverse.status == RequestStatus::Pending {
            let affected = bounded(
                self.op_timeout,
                self.store.update_status_if(
                    &reverse.id,
                    RequestStatus::Pending,
                    RequestStatus::Accepted,
                    requester,
                ),
            )
            .await?;

            if affected == 0 {
                // A concurrent acceptance got there first; the outcome is the same
                debug!(request_id = %reverse.id, "reverse request already resolved");
            }
        }

        bounded(
            self.op_timeout,
            self.store
                .delete_where(EdgePredicate::directed(requester, recipient, &LIVE_STATUSES)),
        )
        .await?;

        info!(requester, recipient, request_id = %reverse.id, "auto-accepted reverse request");
        Ok(RequestOutcome::new(RequestStatus::Accepted, &reverse.id))
    }

    async fn insert_pending(&self, requester: &str, recipient: &str) -> Result<RequestOutcome> {
        let row = bounded(
            self.op_timeout,
            self.store.insert(NewFriendRequest {
                requester_id: requester.to_string(),
                recipient_id: recipient.to_string(),
            }),
        )
        .await?;

        info!(requester, recipient, request_id = %row.id, "friend request sent");
        Ok(RequestOutcome::new(RequestStatus::Pending, row.id))
    }

    /// Decline a pending request addressed to `recipient`
    pub async fn decline_request(&self, recipient: &str, request_id: &str) -> Result<RequestOutcome> {
        let row = self.fetch(request_id).await?;

        if row.recipient_id != recipient {
            return Err(CorkboardError::Forbidden(
                "only the recipient may decline a request".to_string(),
            ));
        }
        if row.status != RequestStatus::Pending {
            return Err(CorkboardError::Validation(format!(
                "request is {}, not pending",
                row.status
            )));
        }

        let affected = bounded(
            self.op_timeout,
            self.store.update_status_if(
                request_id,
                RequestStatus::Pending,
                RequestStatus::Declined,
                recipient,
            ),
        )
        .await?;

        if affected == 0 {
            return Err(CorkboardError::Validation(
                "request is no longer pending".to_string(),
            ));
        }

        info!(recipient, request_id, "friend request declined");
        Ok(RequestOutcome::new(RequestStatus::Declined, request_id))
    }

    /// Stamp `seen_at` on a request addressed to `recipient`. Idempotent;
    /// requests that already left `pending` are left untouched.
    pub async fn mark_request_seen(&self, recipient: &str, request_id: &str) -> Result<()> {
        let row = self.fetch(request_id).await?;

        if row.recipient_id != recipient {
            return Err(CorkboardError::Forbidden(
                "only the recipient may mark a request seen".to_string(),
            ));
        }
        if row.status != RequestStatus::Pending {
            return Ok(());
        }

        bounded(self.op_timeout, self.store.mark_seen(request_id, recipient)).await?;
        Ok(())
    }

    /// Delete the edge `request_id` on behalf of `actor`, who must be a
    /// party to it.
    ///
    /// A live (`pending` or `accepted`) edge makes this an unfriend/cancel:
    /// all live rows in both directions for the pair are deleted, the two
    /// direction deletes issued concurrently. The pair of deletes is not
    /// atomic — if either side fails the whole operation reports failure,
    /// and because deleting an already-deleted row is a no-op, the caller
    /// may retry the same call to finish the job. A `declined` edge deletes
    /// only that single row.
    pub async fn delete_or_unfriend(&self, actor: &str, request_id: &str) -> Result<()> {
        let row = self.fetch(request_id).await?;

        if row.requester_id != actor && row.recipient_id != actor {
            return Err(CorkboardError::Forbidden(
                "caller is not a party to this request".to_string(),
            ));
        }

        if row.status == RequestStatus::Declined {
            bounded(
                self.op_timeout,
                self.store.delete_where(EdgePredicate::by_id(request_id)),
            )
            .await
            .map_err(|e| policy_or_store(e, "cannot delete declined request"))?;

            info!(actor, request_id, "declined request deleted");
            return Ok(());
        }

        let a = row.requester_id.as_str();
        let b = row.recipient_id.as_str();

        let forward = bounded(
            self.op_timeout,
            self.store
                .delete_where(EdgePredicate::directed(a, b, &LIVE_STATUSES)),
        );
        let reverse = bounded(
            self.op_timeout,
            self.store
                .delete_where(EdgePredicate::directed(b, a, &LIVE_STATUSES)),
        );

        // Both deletes always run; a one-sided failure leaves the other
        // direction cleaned up and the retry is a plain re-issue.
        let (forward_result, reverse_result) = futures::future::join(forward, reverse).await;

        match (forward_result, reverse_result) {
            (Ok(removed_forward), Ok(removed_reverse)) => {
                info!(
                    actor,
                    request_id,
                    removed = removed_forward + removed_reverse,
                    "unfriended"
                );
                Ok(())
            }
            (Err(e), Ok(_)) => {
                warn!(actor, request_id, error = %e, "unfriend left the reverse direction deleted only");
                Err(policy_or_store(e, "unfriend failed for one direction; retry to finish"))
            }
            (Ok(_), Err(e)) => {
                warn!(actor, request_id, error = %e, "unfriend left the forward direction deleted only");
                Err(policy_or_store(e, "unfriend failed for one direction; retry to finish"))
            }
            (Err(e), Err(other)) => {
                warn!(actor, request_id, error = %e, other_error = %other, "unfriend failed in both directions");
                Err(policy_or_store(e, "unfriend failed; retry to finish"))
            }
        }
    }

    async fn fetch(&self, request_id: &str) -> Result<crate::storage::models::FriendRequest> {
        bounded(self.op_timeout, self.store.get(request_id))
            .await?
            .ok_or_else(|| {
                CorkboardError::NotFound(format!("friend request '{request_id}' not found"))
            })
    }
}

fn validate_pair(requester: &str, recipient: &str) -> Result<()> {
    if requester.is_empty() || recipient.is_empty() {
        return Err(CorkboardError::Validation(
            "requester and recipient are required".to_string(),
        ));
    }
    if requester == recipient {
        return Err(CorkboardError::Validation(
            "cannot send a friend request to yourself".to_string(),
        ));
    }
    Ok(())
}

/// Distinguish a store-policy rejection, which carries actionable detail,
/// from any other store failure.
fn policy_or_store(err: StorageError, detail: &str) -> CorkboardError {
    match err {
        StorageError::PermissionDenied(msg) => {
            CorkboardError::PolicyDenied(format!("{detail}: {msg}"))
        }
        other => CorkboardError::Store(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::models::FriendRequest;
    use crate::storage::traits::MockRelationshipStore;
    use chrono::Utc;
    use mockall::predicate::eq;

    const TIMEOUT: Duration = Duration::from_secs(1);

    fn pending_row(id: &str, requester: &str, recipient: &str) -> FriendRequest {
        FriendRequest {
            id: id.to_string(),
            requester_id: requester.to_string(),
            recipient_id: recipient.to_string(),
            status: RequestStatus::Pending,
            created_at: Utc::now(),
            responded_at: None,
            seen_at: None,
        }
    }

    fn accepted_row(id: &str, requester: &str, recipient: &str) -> FriendRequest {
        FriendRequest {
            status: RequestStatus::Accepted,
            responded_at: Some(Utc::now()),
            seen_at: Some(Utc::now()),
            ..pending_row(id, requester, recipient)
        }
    }

    #[tokio::test]
    async fn self_request_is_rejected_without_store_calls() {
        let store = MockRelationshipStore::new();
        let machine = FriendRequestStateMachine::new(Arc::new(store), TIMEOUT);

        let err = machine.request_friendship("alice", "alice").await.unwrap_err();
        assert!(matches!(err, CorkboardError::Validation(_)));
    }

    #[tokio::test]
    async fn lost_auto_accept_race_still_reports_accepted() {
        let mut store = MockRelationshipStore::new();
        store
            .expect_query_pair()
            .with(eq("bob"), eq("alice"), eq(DIRECTION_HISTORY_LIMIT))
            .returning(|_, _, _| Ok(vec![pending_row("r1", "bob", "alice")]));
        // Guard fails: a concurrent acceptance already transitioned the row
        store
            .expect_update_status_if()
            .returning(|_, _, _, _| Ok(0));
        store.expect_delete_where().returning(|_| Ok(0));

        let machine = FriendRequestStateMachine::new(Arc::new(store), TIMEOUT);
        let outcome = machine.request_friendship("alice", "bob").await.unwrap();
        assert_eq!(outcome, RequestOutcome::new(RequestStatus::Accepted, "r1"));
    }

    #[tokio::test]
    async fn partial_unfriend_failure_is_reported() {
        let mut store = MockRelationshipStore::new();
        store
            .expect_get()
            .with(eq("r1"))
            .returning(|_| Ok(Some(accepted_row("r1", "alice", "bob"))));
        store.expect_delete_where().returning(|predicate| {
            if predicate.requester_id.as_deref() == Some("alice") {
                Ok(1)
            } else {
                Err(StorageError::Operation("connection reset".to_string()))
            }
        });

        let machine = FriendRequestStateMachine::new(Arc::new(store), TIMEOUT);
        let err = machine.delete_or_unfriend("alice", "r1").await.unwrap_err();
        assert!(matches!(err, CorkboardError::Store(_)));
    }

    #[tokio::test]
    async fn store_policy_rejection_surfaces_as_policy_denied() {
        let mut store = MockRelationshipStore::new();
        store
            .expect_get()
            .with(eq("r1"))
            .returning(|_| Ok(Some(accepted_row("r1", "alice", "bob"))));
        store.expect_delete_where().returning(|_| {
            Err(StorageError::PermissionDenied(
                "delete requires row ownership".to_string(),
            ))
        });

        let machine = FriendRequestStateMachine::new(Arc::new(store), TIMEOUT);
        let err = machine.delete_or_unfriend("alice", "r1").await.unwrap_err();
        assert!(matches!(err, CorkboardError::PolicyDenied(_)));
    }

    #[tokio::test]
    async fn delete_by_non_party_is_forbidden() {
        let mut store = MockRelationshipStore::new();
        store
            .expect_get()
            .with(eq("r1"))
            .returning(|_| Ok(Some(accepted_row("r1", "alice", "bob"))));

        let machine = FriendRequestStateMachine::new(Arc::new(store), TIMEOUT);
        let err = machine.delete_or_unfriend("mallory", "r1").await.unwrap_err();
        assert!(matches!(err, CorkboardError::Forbidden(_)));
    }

    use crate::storage::errors::StorageResult;

    /// Store stub whose queries never come back
    #[derive(Debug)]
    struct HangingStore;

    #[async_trait::async_trait]
    impl RelationshipStore for HangingStore {
        async fn insert(&self, _edge: NewFriendRequest) -> StorageResult<FriendRequest> {
            unimplemented!()
        }

        async fn get(&self, _id: &str) -> StorageResult<Option<FriendRequest>> {
            unimplemented!()
        }

        async fn update_status_if(
            &self,
            _id: &str,
            _expected_status: RequestStatus,
            _new_status: RequestStatus,
            _expected_recipient: &str,
        ) -> StorageResult<u64> {
            unimplemented!()
        }

        async fn mark_seen(&self, _id: &str, _expected_recipient: &str) -> StorageResult<u64> {
            unimplemented!()
        }

        async fn delete_where(&self, _predicate: EdgePredicate) -> StorageResult<u64> {
            unimplemented!()
        }

        async fn query_pair(
            &self,
            _requester: &str,
            _recipient: &str,
            _limit: usize,
        ) -> StorageResult<Vec<FriendRequest>> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(vec![])
        }

        async fn query_edges_touching_any(
            &self,
            _user_ids: &[String],
            _role: crate::storage::filters::EdgeRole,
            _status: RequestStatus,
        ) -> StorageResult<Vec<FriendRequest>> {
            unimplemented!()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn hung_store_call_surfaces_as_timeout() {
        let machine = FriendRequestStateMachine::new(Arc::new(HangingStore), TIMEOUT);
        let err = machine.request_friendship("alice", "bob").await.unwrap_err();
        assert!(matches!(
            err,
            CorkboardError::Store(StorageError::Timeout(_))
        ));
    }
}
