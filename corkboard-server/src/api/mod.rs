//! API implementation for the Corkboard HTTP server

use std::sync::Arc;

use axum::{
    Router, middleware,
    response::Json,
    routing::{delete, get, post},
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::state::AppState;

pub mod auth;
pub mod dto;
pub mod feed;
pub mod friends;
pub mod governor;

use auth::auth_middleware;
use governor::governor_middleware;

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        friends::send_request,
        friends::decline_request,
        friends::mark_request_seen,
        friends::delete_request,
        friends::get_relationship,
        friends::list_incoming_requests,
        feed::list_feed,
    ),
    components(
        schemas(
            dto::SendFriendRequestBody,
            dto::RequestOutcomeDto,
            dto::DeleteOutcomeDto,
            dto::RelationshipDto,
            dto::IncomingRequestDto,
            dto::FeedItemDto,
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "friends", description = "Friend-request state machine and relationship views"),
        (name = "feed", description = "Visibility-filtered content listing"),
    ),
    info(
        title = "Corkboard Social API",
        version = "1.0.0",
        description = "Friend requests, relationship views, and privacy-filtered content for the Corkboard wine journal.",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "/api", description = "API base path")
    )
)]
pub struct ApiDoc;

/// Create the main router with all API endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        // Friend-request endpoints
        .route("/friends/requests", post(friends::send_request))
        .route(
            "/friends/requests/incoming",
            get(friends::list_incoming_requests),
        )
        .route(
            "/friends/requests/{id}/decline",
            post(friends::decline_request),
        )
        .route(
            "/friends/requests/{id}/seen",
            post(friends::mark_request_seen),
        )
        .route("/friends/requests/{id}", delete(friends::delete_request))
        .route(
            "/friends/relationship/{user_id}",
            get(friends::get_relationship),
        )
        // Feed endpoint
        .route("/feed", get(feed::list_feed))
        // Health check endpoint
        .route("/health", get(health_check))
        // Mutations pass through the governor; identity is attached first
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            governor_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state);

    // Main router with API prefix and documentation
    let swagger_router = SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi());

    Router::new().nest("/api", api_router).merge(swagger_router)
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses(
        (status = 200, description = "Service health", body = serde_json::Value)
    )
)]
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "OK",
        "version": corkboard::VERSION,
    }))
}
