//! Engine assembly
//!
//! [`Corkboard`] wires the storage collaborators into the relationship
//! state machine, query service, visibility resolver, and rate governor,
//! and hands out shared references to each. Constructed once per process
//! and injected into request handlers.

use std::sync::Arc;

use crate::Result;
use crate::config::CorkboardConfig;
use crate::ratelimit::RateGovernor;
use crate::relationships::{FriendRequestStateMachine, RelationshipQueryService};
use crate::storage::traits::{ContentStore, RelationshipStore};
use crate::storage::{create_content_store, create_relationship_store};
use crate::visibility::VisibilityResolver;

/// The assembled social-graph engine
#[derive(Debug, Clone)]
pub struct Corkboard {
    config: CorkboardConfig,
    relationship_store: Arc<dyn RelationshipStore>,
    content_store: Arc<dyn ContentStore>,
    state_machine: Arc<FriendRequestStateMachine>,
    queries: Arc<RelationshipQueryService>,
    visibility: Arc<VisibilityResolver>,
    governor: Arc<RateGovernor>,
}

impl Corkboard {
    /// Build the engine with the stores selected by the configuration
    pub fn from_config(config: CorkboardConfig) -> Result<Self> {
        let relationship_store = create_relationship_store(&config);
        let content_store = create_content_store(&config);
        Ok(Self::with_stores(config, relationship_store, content_store))
    }

    /// Build the engine over externally-constructed stores (the swap point
    /// for a managed backend)
    pub fn with_stores(
        config: CorkboardConfig,
        relationship_store: Arc<dyn RelationshipStore>,
        content_store: Arc<dyn ContentStore>,
    ) -> Self {
        let op_timeout = config.store.op_timeout;
        let state_machine = Arc::new(FriendRequestStateMachine::new(
            Arc::clone(&relationship_store),
            op_timeout,
        ));
        let queries = Arc::new(RelationshipQueryService::new(
            Arc::clone(&relationship_store),
            op_timeout,
        ));
        let visibility = Arc::new(VisibilityResolver::new(Arc::clone(&queries)));
        let governor = Arc::new(RateGovernor::new(config.rate_limit.sweep_threshold));

        Self {
            config,
            relationship_store,
            content_store,
            state_machine,
            queries,
            visibility,
            governor,
        }
    }

    /// The engine's configuration
    pub fn config(&self) -> &CorkboardConfig {
        &self.config
    }

    /// Write transitions of relationship edges
    pub fn state_machine(&self) -> &Arc<FriendRequestStateMachine> {
        &self.state_machine
    }

    /// Read-side relationship queries
    pub fn queries(&self) -> &Arc<RelationshipQueryService> {
        &self.queries
    }

    /// Content visibility decisions
    pub fn visibility(&self) -> &Arc<VisibilityResolver> {
        &self.visibility
    }

    /// The request-rate governor
    pub fn governor(&self) -> &Arc<RateGovernor> {
        &self.governor
    }

    /// The relationship store collaborator
    pub fn relationship_store(&self) -> &Arc<dyn RelationshipStore> {
        &self.relationship_store
    }

    /// The content store collaborator
    pub fn content_store(&self) -> &Arc<dyn ContentStore> {
        &self.content_store
    }
}
