//! Predicate types for edge queries and deletes

use serde::{Deserialize, Serialize};

use crate::storage::models::{FriendRequest, RequestStatus};

/// Which side of an edge a user id is matched against
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EdgeRole {
    /// The sending side
    Requester,
    /// The receiving side
    Recipient,
}

/// Predicate over requester/recipient/status/id, used by
/// `RelationshipStore::delete_where`. Unset fields match anything; an empty
/// status list matches any status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EdgePredicate {
    /// Match a specific edge id
    pub id: Option<String>,

    /// Match edges sent by this user
    pub requester_id: Option<String>,

    /// Match edges addressed to this user
    pub recipient_id: Option<String>,

    /// Match edges in any of these statuses
    pub statuses: Vec<RequestStatus>,
}

impl EdgePredicate {
    /// Predicate matching a single edge by id
    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    /// Predicate matching the directed edges from `requester` to `recipient`
    /// in any of `statuses`
    pub fn directed(
        requester: impl Into<String>,
        recipient: impl Into<String>,
        statuses: &[RequestStatus],
    ) -> Self {
        Self {
            id: None,
            requester_id: Some(requester.into()),
            recipient_id: Some(recipient.into()),
            statuses: statuses.to_vec(),
        }
    }

    /// Whether an edge satisfies this predicate
    pub fn matches(&self, edge: &FriendRequest) -> bool {
        if let Some(id) = &self.id
            && *id != edge.id
        {
            return false;
        }
        if let Some(requester) = &self.requester_id
            && *requester != edge.requester_id
        {
            return false;
        }
        if let Some(recipient) = &self.recipient_id
            && *recipient != edge.recipient_id
        {
            return false;
        }
        if !self.statuses.is_empty() && !self.statuses.contains(&edge.status) {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn edge(requester: &str, recipient: &str, status: RequestStatus) -> FriendRequest {
        FriendRequest {
            id: format!("{requester}-{recipient}"),
            requester_id: requester.to_string(),
            recipient_id: recipient.to_string(),
            status,
            created_at: Utc::now(),
            responded_at: None,
            seen_at: None,
        }
    }

    #[test]
    fn directed_predicate_matches_direction_and_status() {
        let predicate = EdgePredicate::directed(
            "alice",
            "bob",
            &[RequestStatus::Pending, RequestStatus::Accepted],
        );

        assert!(predicate.matches(&edge("alice", "bob", RequestStatus::Pending)));
        assert!(predicate.matches(&edge("alice", "bob", RequestStatus::Accepted)));
        assert!(!predicate.matches(&edge("alice", "bob", RequestStatus::Declined)));
        assert!(!predicate.matches(&edge("bob", "alice", RequestStatus::Pending)));
    }

    #[test]
    fn empty_status_list_matches_any_status() {
        let predicate = EdgePredicate::directed("alice", "bob", &[]);
        assert!(predicate.matches(&edge("alice", "bob", RequestStatus::Declined)));
    }

    #[test]
    fn id_predicate_matches_single_edge() {
        let predicate = EdgePredicate::by_id("alice-bob");
        assert!(predicate.matches(&edge("alice", "bob", RequestStatus::Pending)));
        assert!(!predicate.matches(&edge("alice", "carol", RequestStatus::Pending)));
    }
}
