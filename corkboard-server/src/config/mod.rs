//! Server configuration module

use std::env;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cli::CliArgs;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,

    /// JWT secret used to validate bearer tokens issued by the external
    /// authentication service
    pub jwt_secret: String,

    /// Maximum number of items returned by the feed endpoint
    pub feed_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            jwt_secret: String::new(),
            feed_limit: 50,
        }
    }
}

impl ServerConfig {
    /// Build the configuration from CLI arguments and environment variables;
    /// CLI arguments take precedence.
    pub fn from_cli_and_env(cli: CliArgs) -> Result<Self> {
        let mut config = Self::default();

        if let Ok(port) = env::var("CORKBOARD_PORT") {
            config.port = port.parse()?;
        }
        if let Ok(secret) = env::var("CORKBOARD_JWT_SECRET") {
            config.jwt_secret = secret;
        }
        if let Ok(limit) = env::var("CORKBOARD_FEED_LIMIT") {
            config.feed_limit = limit.parse()?;
        }

        if let Some(port) = cli.port {
            config.port = port;
        }
        if let Some(secret) = cli.jwt_secret {
            config.jwt_secret = secret;
        }

        if config.jwt_secret.is_empty() {
            warn!("No JWT secret configured; using a development-only default");
            config.jwt_secret = "corkboard-dev-secret".to_string();
        }

        Ok(config)
    }
}
