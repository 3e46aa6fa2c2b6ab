//! Application state management

use corkboard::Corkboard;
use corkboard::ratelimit::RatePolicy;

use crate::config::ServerConfig;

/// Application state shared across all handlers
#[derive(Debug)]
pub struct AppState {
    /// The assembled social-graph engine
    pub engine: Corkboard,

    /// Server configuration
    pub config: ServerConfig,
}

impl AppState {
    /// Create new application state
    pub fn new(engine: Corkboard, config: ServerConfig) -> Self {
        Self { engine, config }
    }

    /// The rate policy for a route key
    pub fn rate_policy(&self, route_key: &str) -> RatePolicy {
        self.engine.config().rate_limit.policy_for(route_key)
    }
}
