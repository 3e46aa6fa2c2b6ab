//! View and outcome types for the relationship engine

use serde::{Deserialize, Serialize};

use crate::storage::models::RequestStatus;

/// Relationship between two users from one user's perspective
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipStatus {
    /// No live edge in either direction
    None,
    /// A pending request from me to them
    RequestSent,
    /// A pending request from them to me
    RequestReceived,
    /// An accepted edge in either direction
    Friends,
}

/// Computed view of the relationship between a user and another user.
///
/// Derived entirely from the two resolved rows (outgoing and incoming) for
/// the pair; recomputed on every read, never cached beyond a single request.
///
/// `following` means the user has an outgoing edge still in force (pending
/// or accepted); `follows_you` is the mirror for the incoming direction.
/// `friend_request_id` is the id of the accepted row when the pair are
/// friends (the most recent one if both directions hold an accepted row).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FriendRelationship {
    /// Overall status of the pair
    pub status: RelationshipStatus,

    /// The user has a live outgoing edge toward the other user
    pub following: bool,

    /// The other user has a live edge toward this user
    pub follows_you: bool,

    /// An accepted edge exists in either direction
    pub friends: bool,

    /// Id of the pending outgoing request, if one exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outgoing_request_id: Option<String>,

    /// Id of the pending incoming request, if one exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incoming_request_id: Option<String>,

    /// Id of the accepted edge backing the friendship, if one exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friend_request_id: Option<String>,
}

impl FriendRelationship {
    /// The view for a pair with no rows at all
    pub fn none() -> Self {
        Self {
            status: RelationshipStatus::None,
            following: false,
            follows_you: false,
            friends: false,
            outgoing_request_id: None,
            incoming_request_id: None,
            friend_request_id: None,
        }
    }
}

/// Result of a successful state-machine mutation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RequestOutcome {
    /// Status of the edge after the operation
    pub status: RequestStatus,

    /// Id of the edge the operation resolved to
    pub request_id: String,
}

impl RequestOutcome {
    pub fn new(status: RequestStatus, request_id: impl Into<String>) -> Self {
        Self {
            status,
            request_id: request_id.into(),
        }
    }
}
