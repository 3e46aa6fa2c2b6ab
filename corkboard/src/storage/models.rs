//! Data structures and models for storage operations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a directed friend-request edge
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// Sent, awaiting a response from the recipient
    Pending,
    /// Accepted by the recipient; a friendship is in force
    Accepted,
    /// Declined by the recipient; re-enterable via a fresh request
    Declined,
}

impl RequestStatus {
    /// Stable wire representation of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Accepted => "accepted",
            RequestStatus::Declined => "declined",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directed friend-request edge from requester to recipient.
///
/// The store enforces no uniqueness constraint on the unordered pair, so
/// multiple rows may exist for the same two users; readers treat the row set
/// as a history and resolve it deterministically (see
/// `relationships::resolution`). A backend that can enforce a canonicalized
/// `(min(a,b), max(a,b))` uniqueness key at insert time should do so, which
/// collapses the duplicate-insert race entirely.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FriendRequest {
    /// Unique identifier for the edge
    pub id: String,

    /// User who sent the request
    pub requester_id: String,

    /// User the request is addressed to
    pub recipient_id: String,

    /// Current status of the edge
    pub status: RequestStatus,

    /// When the edge was created
    pub created_at: DateTime<Utc>,

    /// When the recipient accepted or declined, if they have
    pub responded_at: Option<DateTime<Utc>>,

    /// When the recipient saw the request, if they have
    pub seen_at: Option<DateTime<Utc>>,
}

/// Payload for inserting a fresh `pending` edge; the store assigns the id
/// and the `created_at` stamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFriendRequest {
    /// User sending the request
    pub requester_id: String,

    /// User the request is addressed to
    pub recipient_id: String,
}

/// Privacy tier attached to a content item
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PrivacyTier {
    /// Visible to everyone
    Public,
    /// Visible to the owner's accepted friends
    Friends,
    /// Visible to friends and one hop beyond
    FriendsOfFriends,
    /// Visible to the owner only
    Private,
}

impl PrivacyTier {
    /// Parse the raw tier string carried on a content row. Absent or
    /// unrecognized tiers default to `Public`.
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            Some("friends") => PrivacyTier::Friends,
            Some("friends_of_friends") => PrivacyTier::FriendsOfFriends,
            Some("private") => PrivacyTier::Private,
            _ => PrivacyTier::Public,
        }
    }
}

/// A content item as the external content store presents it. Consumed
/// read-only here; only `owner_id` and `privacy_tier` participate in
/// visibility decisions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentItem {
    /// Unique identifier for the item
    pub id: String,

    /// User who owns the item
    pub owner_id: String,

    /// Raw privacy tier string; absent or unrecognized values render the
    /// item public
    pub privacy_tier: Option<String>,

    /// When the item was created
    pub created_at: DateTime<Utc>,
}

impl ContentItem {
    /// The parsed privacy tier of this item
    pub fn tier(&self) -> PrivacyTier {
        PrivacyTier::from_raw(self.privacy_tier.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_tier_defaults_to_public() {
        assert_eq!(PrivacyTier::from_raw(None), PrivacyTier::Public);
        assert_eq!(PrivacyTier::from_raw(Some("")), PrivacyTier::Public);
        assert_eq!(PrivacyTier::from_raw(Some("everyone")), PrivacyTier::Public);
        assert_eq!(PrivacyTier::from_raw(Some("friends")), PrivacyTier::Friends);
        assert_eq!(
            PrivacyTier::from_raw(Some("friends_of_friends")),
            PrivacyTier::FriendsOfFriends
        );
        assert_eq!(PrivacyTier::from_raw(Some("private")), PrivacyTier::Private);
    }
}
