//! The social-graph relationship engine
//!
//! Write transitions live in [`state_machine`], read-side reduction in
//! [`queries`], and the shared history-resolution policy in [`resolution`].

pub mod queries;
pub mod resolution;
pub mod state_machine;
pub mod types;

pub use queries::RelationshipQueryService;
pub use state_machine::FriendRequestStateMachine;
pub use types::{FriendRelationship, RelationshipStatus, RequestOutcome};
