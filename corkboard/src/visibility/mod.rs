//! Privacy-tiered visibility decisions
//!
//! [`VisibilityResolver`] answers whether a viewer may see a content item,
//! given its owner and privacy tier. List renderers use the batch path,
//! which computes the viewer's friend sets exactly once and evaluates every
//! item against them; the batch result for an item is identical to the
//! single-item path by construction, and tested as such.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::Result;
use crate::relationships::RelationshipQueryService;
use crate::storage::models::{ContentItem, PrivacyTier};

/// Decides content visibility for (viewer, owner, tier) triples
#[derive(Debug)]
pub struct VisibilityResolver {
    queries: Arc<RelationshipQueryService>,
}

/// A viewer's precomputed friend sets, valid for a single request
#[derive(Debug)]
pub struct VisibilityContext {
    viewer: String,
    friends: HashSet<String>,
    /// Only populated when something in the request needs the one-hop
    /// expansion; items gated on it are invisible otherwise.
    friends_of_friends: Option<HashSet<String>>,
}

impl VisibilityContext {
    /// Whether the viewer may see an item owned by `owner` at tier
    /// `tier_raw` (absent/unrecognized tiers are public)
    pub fn can_view(&self, owner: &str, tier_raw: Option<&str>) -> bool {
        if self.viewer == owner {
            return true;
        }
        match PrivacyTier::from_raw(tier_raw) {
            PrivacyTier::Public => true,
            PrivacyTier::Private => false,
            PrivacyTier::Friends => self.friends.contains(owner),
            PrivacyTier::FriendsOfFriends => {
                self.friends.contains(owner)
                    || self
                        .friends_of_friends
                        .as_ref()
                        .is_some_and(|fof| fof.contains(owner))
            }
        }
    }

    /// Convenience form over a content row
    pub fn can_view_item(&self, item: &ContentItem) -> bool {
        self.can_view(&item.owner_id, item.privacy_tier.as_deref())
    }
}

impl VisibilityResolver {
    /// Create a resolver over the relationship query service
    pub fn new(queries: Arc<RelationshipQueryService>) -> Self {
        Self { queries }
    }

    /// Build the precomputed context for `viewer`. The friends-of-friends
    /// expansion is only loaded when `include_friends_of_friends` is set;
    /// pass true whenever any item under consideration carries that tier.
    pub async fn context_for(
        &self,
        viewer: &str,
        include_friends_of_friends: bool,
    ) -> Result<VisibilityContext> {
        let friends = self.queries.accepted_friend_ids(viewer).await?;
        let friends_of_friends = if include_friends_of_friends {
            Some(
                self.queries
                    .friends_of_friends_ids(viewer, &friends)
                    .await?,
            )
        } else {
            None
        };

        Ok(VisibilityContext {
            viewer: viewer.to_string(),
            friends,
            friends_of_friends,
        })
    }

    /// Single-item visibility check. Owner, public, and private tiers
    /// short-circuit before any store access.
    pub async fn can_view(
        &self,
        viewer: &str,
        owner: &str,
        tier_raw: Option<&str>,
    ) -> Result<bool> {
        if viewer == owner {
            return Ok(true);
        }
        let tier = PrivacyTier::from_raw(tier_raw);
        match tier {
            PrivacyTier::Public => Ok(true),
            PrivacyTier::Private => Ok(false),
            PrivacyTier::Friends | PrivacyTier::FriendsOfFriends => {
                let context = self
                    .context_for(viewer, tier == PrivacyTier::FriendsOfFriends)
                    .await?;
                Ok(context.can_view(owner, tier_raw))
            }
        }
    }

    /// Batch visibility over `items`: the friend sets are computed exactly
    /// once and each item evaluated against them. Result `i` answers for
    /// item `i`.
    pub async fn resolve_batch(&self, viewer: &str, items: &[ContentItem]) -> Result<Vec<bool>> {
        let needs_fof = items
            .iter()
            .any(|item| item.tier() == PrivacyTier::FriendsOfFriends);
        let context = self.context_for(viewer, needs_fof).await?;

        let decisions = items.iter().map(|item| context.can_view_item(item)).collect();
        debug!(viewer, items = items.len(), "resolved batch visibility");
        Ok(decisions)
    }

    /// Batch filter retaining only the items the viewer may see, in order
    pub async fn filter_visible(
        &self,
        viewer: &str,
        items: Vec<ContentItem>,
    ) -> Result<Vec<ContentItem>> {
        let decisions = self.resolve_batch(viewer, &items).await?;
        Ok(items
            .into_iter()
            .zip(decisions)
            .filter_map(|(item, visible)| visible.then_some(item))
            .collect())
    }
}
