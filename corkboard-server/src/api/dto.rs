//! Request and response DTOs for the Corkboard API

use chrono::{DateTime, Utc};
use corkboard::relationships::{FriendRelationship, RequestOutcome};
use corkboard::storage::models::{ContentItem, FriendRequest};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request to send a friend request
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct SendFriendRequestBody {
    /// User the request is addressed to
    pub recipient_id: String,
}

/// Outcome of a friend-request mutation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RequestOutcomeDto {
    /// Edge status after the operation
    pub status: String,

    /// Id of the edge the operation resolved to
    pub request_id: String,
}

impl From<RequestOutcome> for RequestOutcomeDto {
    fn from(outcome: RequestOutcome) -> Self {
        Self {
            status: outcome.status.as_str().to_string(),
            request_id: outcome.request_id,
        }
    }
}

/// Outcome of a delete/unfriend mutation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteOutcomeDto {
    /// Always `deleted`
    pub status: String,

    /// The edge the delete was addressed to
    pub request_id: String,
}

/// Relationship view between the caller and another user
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RelationshipDto {
    pub status: String,
    pub following: bool,
    pub follows_you: bool,
    pub friends: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outgoing_request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incoming_request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friend_request_id: Option<String>,
}

impl From<FriendRelationship> for RelationshipDto {
    fn from(view: FriendRelationship) -> Self {
        let status = match view.status {
            corkboard::relationships::RelationshipStatus::None => "none",
            corkboard::relationships::RelationshipStatus::RequestSent => "request_sent",
            corkboard::relationships::RelationshipStatus::RequestReceived => "request_received",
            corkboard::relationships::RelationshipStatus::Friends => "friends",
        };
        Self {
            status: status.to_string(),
            following: view.following,
            follows_you: view.follows_you,
            friends: view.friends,
            outgoing_request_id: view.outgoing_request_id,
            incoming_request_id: view.incoming_request_id,
            friend_request_id: view.friend_request_id,
        }
    }
}

/// A pending incoming friend request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IncomingRequestDto {
    pub id: String,
    pub requester_id: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seen_at: Option<DateTime<Utc>>,
}

impl From<FriendRequest> for IncomingRequestDto {
    fn from(row: FriendRequest) -> Self {
        Self {
            id: row.id,
            requester_id: row.requester_id,
            created_at: row.created_at,
            seen_at: row.seen_at,
        }
    }
}

/// A content item visible to the caller
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FeedItemDto {
    pub id: String,
    pub owner_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privacy_tier: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ContentItem> for FeedItemDto {
    fn from(item: ContentItem) -> Self {
        Self {
            id: item.id,
            owner_id: item.owner_id,
            privacy_tier: item.privacy_tier,
            created_at: item.created_at,
        }
    }
}
