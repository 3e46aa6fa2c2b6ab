//! Read-side reduction of edge histories to authoritative views
//!
//! [`RelationshipQueryService`] loads the recent rows between two users in
//! both directions (concurrently), resolves each direction with the policy
//! in `resolution`, and reduces the two resolved rows to a
//! [`FriendRelationship`]. It also computes the accepted friend set and its
//! one-hop expansion, which the visibility resolver builds on.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::relationships::resolution::{DIRECTION_HISTORY_LIMIT, resolve};
use crate::relationships::types::{FriendRelationship, RelationshipStatus};
use crate::storage::bounded;
use crate::storage::filters::EdgeRole;
use crate::storage::models::{FriendRequest, RequestStatus};
use crate::storage::traits::RelationshipStore;
use crate::Result;

/// Read-only queries over the friend-request table
#[derive(Debug)]
pub struct RelationshipQueryService {
    store: Arc<dyn RelationshipStore>,
    op_timeout: Duration,
}

impl RelationshipQueryService {
    /// Create a new query service over the given store
    pub fn new(store: Arc<dyn RelationshipStore>, op_timeout: Duration) -> Self {
        Self { store, op_timeout }
    }

    /// The relationship between `user` and `other`, from `user`'s
    /// perspective. Recomputed from the store on every call.
    pub async fn relationship_between(
        &self,
        user: &str,
        other: &str,
    ) -> Result<FriendRelationship> {
        if user == other {
            return Ok(FriendRelationship::none());
        }

        let (outgoing_rows, incoming_rows) = futures::future::try_join(
            bounded(
                self.op_timeout,
                self.store.query_pair(user, other, DIRECTION_HISTORY_LIMIT),
            ),
            bounded(
                self.op_timeout,
                self.store.query_pair(other, user, DIRECTION_HISTORY_LIMIT),
            ),
        )
        .await?;

        Ok(derive_view(
            resolve(&outgoing_rows),
            resolve(&incoming_rows),
        ))
    }

    /// All users with an `accepted` edge to or from `user`.
    ///
    /// This is the foundational set for tier checks; list renderers compute
    /// it once per request and pass it into downstream checks rather than
    /// recomputing per item.
    pub async fn accepted_friend_ids(&self, user: &str) -> Result<HashSet<String>> {
        let ids = [user.to_string()];
        let (sent, received) = futures::future::try_join(
            bounded(
                self.op_timeout,
                self.store
                    .query_edges_touching_any(&ids, EdgeRole::Requester, RequestStatus::Accepted),
            ),
            bounded(
                self.op_timeout,
                self.store
                    .query_edges_touching_any(&ids, EdgeRole::Recipient, RequestStatus::Accepted),
            ),
        )
        .await?;

        let mut friends = HashSet::new();
        for edge in sent.iter().chain(received.iter()) {
            let friend = other_end(edge, user);
            if friend != user {
                friends.insert(friend.to_string());
            }
        }

        debug!(user, count = friends.len(), "computed accepted friend set");
        Ok(friends)
    }

    /// Users one accepted hop beyond `friends`, excluding `user` and the
    /// direct friends themselves
    pub async fn friends_of_friends_ids(
        &self,
        user: &str,
        friends: &HashSet<String>,
    ) -> Result<HashSet<String>> {
        if friends.is_empty() {
            return Ok(HashSet::new());
        }

        let friend_ids: Vec<String> = friends.iter().cloned().collect();
        let (sent, received) = futures::future::try_join(
            bounded(
                self.op_timeout,
                self.store.query_edges_touching_any(
                    &friend_ids,
                    EdgeRole::Requester,
                    RequestStatus::Accepted,
                ),
            ),
            bounded(
                self.op_timeout,
                self.store.query_edges_touching_any(
                    &friend_ids,
                    EdgeRole::Recipient,
                    RequestStatus::Accepted,
                ),
            ),
        )
        .await?;

        let mut expanded = HashSet::new();
        for edge in sent.iter().chain(received.iter()) {
            for candidate in [edge.requester_id.as_str(), edge.recipient_id.as_str()] {
                if candidate != user && !friends.contains(candidate) {
                    expanded.insert(candidate.to_string());
                }
            }
        }

        debug!(user, count = expanded.len(), "computed friends-of-friends set");
        Ok(expanded)
    }

    /// Pending requests addressed to `user`, newest first
    pub async fn list_incoming_pending(&self, user: &str) -> Result<Vec<FriendRequest>> {
        let ids = [user.to_string()];
        let rows = bounded(
            self.op_timeout,
            self.store
                .query_edges_touching_any(&ids, EdgeRole::Recipient, RequestStatus::Pending),
        )
        .await?;
        Ok(rows)
    }
}

fn other_end<'a>(edge: &'a FriendRequest, user: &str) -> &'a str {
    if edge.requester_id == user {
        &edge.recipient_id
    } else {
        &edge.requester_id
    }
}

fn is_live(row: Option<&FriendRequest>) -> bool {
    matches!(
        row.map(|r| r.status),
        Some(RequestStatus::Pending) | Some(RequestStatus::Accepted)
    )
}

/// Reduce the two resolved rows for a pair to the computed view
fn derive_view(
    outgoing: Option<&FriendRequest>,
    incoming: Option<&FriendRequest>,
) -> FriendRelationship {
    let accepted: Vec<&FriendRequest> = outgoing
        .iter()
        .chain(incoming.iter())
        .filter(|r| r.status == RequestStatus::Accepted)
        .copied()
        .collect();
    let friend_request = accepted.iter().max_by_key(|r| r.created_at).copied();

    let outgoing_pending = outgoing.filter(|r| r.status == RequestStatus::Pending);
    let incoming_pending = incoming.filter(|r| r.status == RequestStatus::Pending);

    let status = if friend_request.is_some() {
        RelationshipStatus::Friends
    } else if outgoing_pending.is_some() {
        RelationshipStatus::RequestSent
    } else if incoming_pending.is_some() {
        RelationshipStatus::RequestReceived
    } else {
        RelationshipStatus::None
    };

    FriendRelationship {
        status,
        following: is_live(outgoing),
        follows_you: is_live(incoming),
        friends: friend_request.is_some(),
        outgoing_request_id: outgoing_pending.map(|r| r.id.clone()),
        incoming_request_id: incoming_pending.map(|r| r.id.clone()),
        friend_request_id: friend_request.map(|r| r.id.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, Utc};

    fn row(
        id: &str,
        requester: &str,
        recipient: &str,
        status: RequestStatus,
        age_secs: i64,
    ) -> FriendRequest {
        FriendRequest {
            id: id.to_string(),
            requester_id: requester.to_string(),
            recipient_id: recipient.to_string(),
            status,
            created_at: Utc::now() - ChronoDuration::seconds(age_secs),
            responded_at: None,
            seen_at: None,
        }
    }

    #[test]
    fn pending_outgoing_derives_request_sent() {
        let outgoing = row("r1", "alice", "bob", RequestStatus::Pending, 10);
        let view = derive_view(Some(&outgoing), None);

        assert_eq!(view.status, RelationshipStatus::RequestSent);
        assert!(view.following);
        assert!(!view.follows_you);
        assert!(!view.friends);
        assert_eq!(view.outgoing_request_id.as_deref(), Some("r1"));
        assert!(view.incoming_request_id.is_none());
        assert!(view.friend_request_id.is_none());
    }

    #[test]
    fn pending_incoming_derives_request_received() {
        let incoming = row("r2", "bob", "alice", RequestStatus::Pending, 10);
        let view = derive_view(None, Some(&incoming));

        assert_eq!(view.status, RelationshipStatus::RequestReceived);
        assert!(!view.following);
        assert!(view.follows_you);
        assert_eq!(view.incoming_request_id.as_deref(), Some("r2"));
    }

    #[test]
    fn accepted_in_either_direction_derives_friends() {
        let incoming = row("r3", "bob", "alice", RequestStatus::Accepted, 10);
        let view = derive_view(None, Some(&incoming));

        assert_eq!(view.status, RelationshipStatus::Friends);
        assert!(view.friends);
        assert!(view.follows_you);
        assert_eq!(view.friend_request_id.as_deref(), Some("r3"));
    }

    #[test]
    fn most_recent_accepted_row_backs_the_friendship() {
        let outgoing = row("old", "alice", "bob", RequestStatus::Accepted, 500);
        let incoming = row("new", "bob", "alice", RequestStatus::Accepted, 5);
        let view = derive_view(Some(&outgoing), Some(&incoming));

        assert_eq!(view.friend_request_id.as_deref(), Some("new"));
    }

    #[test]
    fn declined_rows_derive_none() {
        let outgoing = row("r4", "alice", "bob", RequestStatus::Declined, 10);
        let view = derive_view(Some(&outgoing), None);

        assert_eq!(view.status, RelationshipStatus::None);
        assert!(!view.following);
        assert!(!view.friends);
        assert!(view.outgoing_request_id.is_none());
    }
}
