//! # Corkboard
//!
//! The social-graph engine of the Corkboard wine journal: a friend-request
//! state machine that stays consistent over a store with no multi-statement
//! atomicity, a privacy-tiered visibility resolver for content lists, and a
//! sliding-window rate governor guarding mutation entry points.
//!
//! ## Quick Start
//!
//! ```rust
//! use corkboard::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // In-memory stores; production deployments inject their managed
//!     // backend through Corkboard::with_stores
//!     let engine = init_with_defaults()?;
//!
//!     let sent = engine.state_machine().request_friendship("ava", "ben").await?;
//!     assert_eq!(sent.status, RequestStatus::Pending);
//!
//!     // The reverse request auto-accepts the pending one
//!     let accepted = engine.state_machine().request_friendship("ben", "ava").await?;
//!     assert_eq!(accepted.status, RequestStatus::Accepted);
//!
//!     let view = engine.queries().relationship_between("ava", "ben").await?;
//!     assert!(view.friends);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **relationships**: write transitions ([`relationships::FriendRequestStateMachine`])
//!   and read-side reduction ([`relationships::RelationshipQueryService`])
//!   over the edge history
//! - **visibility**: per-item and batch privacy-tier decisions built on the
//!   accepted friend set
//! - **ratelimit**: the in-process sliding-window governor
//! - **storage**: the repository traits the external store implements, plus
//!   the bundled in-memory backend
//!
//! The separate server crate exposes these over HTTP.

pub mod config;
pub mod engine;
pub mod logging;
pub mod ratelimit;
pub mod relationships;
pub mod storage;
pub mod visibility;

pub use engine::Corkboard;

/// The prelude re-exports commonly used types for convenience
pub mod prelude {
    pub use crate::engine::Corkboard;

    // Re-export core initialization functions
    pub use crate::{init, init_with_defaults};

    // Re-export config types
    pub use crate::config::{ConfigBuilder, CorkboardConfig, LogFormat, LogLevel, StoreBackend};

    // Re-export relationship types
    pub use crate::relationships::{
        FriendRelationship, RelationshipStatus, RequestOutcome,
    };

    // Re-export storage types for advanced usage
    pub use crate::storage::errors::StorageError;
    pub use crate::storage::models::{ContentItem, FriendRequest, PrivacyTier, RequestStatus};

    // Re-export rate governor types
    pub use crate::ratelimit::{RateDecision, RateGovernor, RatePolicy, RateSubject};

    // Re-export essential result type
    pub use crate::{CorkboardError, ErrorKind, Result};
}

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error type for Corkboard operations
#[derive(Debug, thiserror::Error)]
pub enum CorkboardError {
    /// No caller identity was presented
    #[error("Authentication required")]
    Unauthenticated,

    /// Malformed or self-referential input, rejected before any store call
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A referenced edge does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The caller is not a party to the edge
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The store's row-level policy rejected a mutation the caller was
    /// otherwise entitled to. Where a recovery path exists
    /// (recreate-after-decline) the engine takes it transparently; this
    /// variant carries the cases with no recovery, naming the missing
    /// permission.
    #[error("Store policy denied the operation: {0}")]
    PolicyDenied(String),

    /// Any other store-layer failure, including timeouts. Never retried
    /// inside the engine; retry policy belongs to the caller.
    #[error("Store failure: {0}")]
    Store(#[from] storage::errors::StorageError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(#[from] config::ConfigError),

    /// Logging error
    #[error("Logging error: {0}")]
    Logging(#[from] logging::LogError),
}

/// Machine-checkable kind of a [`CorkboardError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Unauthenticated,
    Validation,
    NotFound,
    Forbidden,
    PolicyDenied,
    Store,
    Configuration,
    Logging,
}

impl ErrorKind {
    /// Stable wire representation of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Unauthenticated => "unauthenticated",
            ErrorKind::Validation => "validation_failed",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::PolicyDenied => "policy_denied",
            ErrorKind::Store => "store_failure",
            ErrorKind::Configuration => "configuration",
            ErrorKind::Logging => "logging",
        }
    }
}

impl CorkboardError {
    /// The machine-checkable kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            CorkboardError::Unauthenticated => ErrorKind::Unauthenticated,
            CorkboardError::Validation(_) => ErrorKind::Validation,
            CorkboardError::NotFound(_) => ErrorKind::NotFound,
            CorkboardError::Forbidden(_) => ErrorKind::Forbidden,
            CorkboardError::PolicyDenied(_) => ErrorKind::PolicyDenied,
            CorkboardError::Store(_) => ErrorKind::Store,
            CorkboardError::Configuration(_) => ErrorKind::Configuration,
            CorkboardError::Logging(_) => ErrorKind::Logging,
        }
    }
}

/// Result type for Corkboard operations
pub type Result<T> = std::result::Result<T, CorkboardError>;

/// Initialize Corkboard with default configuration
pub fn init_with_defaults() -> Result<Corkboard> {
    let config = config::ConfigBuilder::defaults().build()?;
    init(config)
}

/// Initialize Corkboard with the provided configuration
///
/// Sets up logging per the configuration (ignoring an already-installed
/// subscriber) and assembles the engine over the configured stores.
pub fn init(config: config::CorkboardConfig) -> Result<Corkboard> {
    let _ = logging::init(&config.logging);
    Corkboard::from_config(config)
}
