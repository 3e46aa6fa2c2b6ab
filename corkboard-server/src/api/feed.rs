//! Content feed endpoint
//!
//! Lists recent content filtered through the batch visibility path: the
//! caller's friend sets are computed once per request and every item is
//! evaluated against them.

use std::sync::Arc;

use axum::{Extension, extract::State, response::Json};
use corkboard::storage::traits::ContentStore;

use crate::{
    api::auth::{AuthContext, require_auth},
    api::dto::FeedItemDto,
    error::ServerResult,
    state::AppState,
};

/// List recent content items visible to the caller
#[utoipa::path(
    get,
    path = "/api/feed",
    tag = "feed",
    responses(
        (status = 200, description = "Visible content, newest first", body = Vec<FeedItemDto>),
        (status = 401, description = "No caller identity"),
    )
)]
pub async fn list_feed(
    State(state): State<Arc<AppState>>,
    auth: Option<Extension<AuthContext>>,
) -> ServerResult<Json<Vec<FeedItemDto>>> {
    let auth = require_auth(auth.as_deref())?;

    let items = state
        .engine
        .content_store()
        .list_recent(state.config.feed_limit)
        .await
        .map_err(corkboard::CorkboardError::from)?;

    let visible = state
        .engine
        .visibility()
        .filter_visible(&auth.user_id, items)
        .await?;

    Ok(Json(visible.into_iter().map(FeedItemDto::from).collect()))
}
