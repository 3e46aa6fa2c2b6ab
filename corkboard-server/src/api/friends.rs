//! Friend-request API endpoints
//!
//! Each endpoint maps to one state-machine or query-service call; the
//! governor middleware has already counted the request by the time a
//! handler runs.

use std::sync::Arc;

use axum::{
    Extension, Json as JsonExtractor,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};

use crate::{
    api::auth::{AuthContext, require_auth},
    api::dto::{DeleteOutcomeDto, IncomingRequestDto, RelationshipDto, RequestOutcomeDto, SendFriendRequestBody},
    error::{ServerError, ServerResult},
    state::AppState,
};

/// Send a friend request
#[utoipa::path(
    post,
    path = "/api/friends/requests",
    tag = "friends",
    request_body = SendFriendRequestBody,
    responses(
        (status = 200, description = "Request sent, or auto-accepted when the reverse request was pending", body = RequestOutcomeDto),
        (status = 400, description = "Missing or self-referential recipient"),
        (status = 401, description = "No caller identity"),
        (status = 429, description = "Rate limit exceeded"),
    )
)]
pub async fn send_request(
    State(state): State<Arc<AppState>>,
    auth: Option<Extension<AuthContext>>,
    JsonExtractor(body): JsonExtractor<SendFriendRequestBody>,
) -> ServerResult<Json<RequestOutcomeDto>> {
    let auth = require_auth(auth.as_deref())?;

    if body.recipient_id.trim().is_empty() {
        return Err(ServerError::Validation(
            "recipient_id is required".to_string(),
        ));
    }

    let outcome = state
        .engine
        .state_machine()
        .request_friendship(&auth.user_id, body.recipient_id.trim())
        .await?;

    Ok(Json(RequestOutcomeDto::from(outcome)))
}

/// Decline a pending friend request
#[utoipa::path(
    post,
    path = "/api/friends/requests/{id}/decline",
    tag = "friends",
    params(("id" = String, Path, description = "Friend request ID")),
    responses(
        (status = 200, description = "Request declined", body = RequestOutcomeDto),
        (status = 403, description = "Caller is not the recipient"),
        (status = 404, description = "Request not found"),
    )
)]
pub async fn decline_request(
    State(state): State<Arc<AppState>>,
    auth: Option<Extension<AuthContext>>,
    Path(id): Path<String>,
) -> ServerResult<Json<RequestOutcomeDto>> {
    let auth = require_auth(auth.as_deref())?;

    let outcome = state
        .engine
        .state_machine()
        .decline_request(&auth.user_id, &id)
        .await?;

    Ok(Json(RequestOutcomeDto::from(outcome)))
}

/// Mark a pending friend request as seen
#[utoipa::path(
    post,
    path = "/api/friends/requests/{id}/seen",
    tag = "friends",
    params(("id" = String, Path, description = "Friend request ID")),
    responses(
        (status = 204, description = "Request marked seen"),
        (status = 403, description = "Caller is not the recipient"),
        (status = 404, description = "Request not found"),
    )
)]
pub async fn mark_request_seen(
    State(state): State<Arc<AppState>>,
    auth: Option<Extension<AuthContext>>,
    Path(id): Path<String>,
) -> ServerResult<StatusCode> {
    let auth = require_auth(auth.as_deref())?;

    state
        .engine
        .state_machine()
        .mark_request_seen(&auth.user_id, &id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Delete a friend request, cancelling it or unfriending
#[utoipa::path(
    delete,
    path = "/api/friends/requests/{id}",
    tag = "friends",
    params(("id" = String, Path, description = "Friend request ID")),
    responses(
        (status = 200, description = "Edge deleted; live edges remove the whole relationship", body = DeleteOutcomeDto),
        (status = 403, description = "Caller is not a party to the request"),
        (status = 404, description = "Request not found"),
    )
)]
pub async fn delete_request(
    State(state): State<Arc<AppState>>,
    auth: Option<Extension<AuthContext>>,
    Path(id): Path<String>,
) -> ServerResult<Json<DeleteOutcomeDto>> {
    let auth = require_auth(auth.as_deref())?;

    state
        .engine
        .state_machine()
        .delete_or_unfriend(&auth.user_id, &id)
        .await?;

    Ok(Json(DeleteOutcomeDto {
        status: "deleted".to_string(),
        request_id: id,
    }))
}

/// Get the relationship between the caller and another user
#[utoipa::path(
    get,
    path = "/api/friends/relationship/{user_id}",
    tag = "friends",
    params(("user_id" = String, Path, description = "The other user")),
    responses(
        (status = 200, description = "Relationship view", body = RelationshipDto),
        (status = 401, description = "No caller identity"),
    )
)]
pub async fn get_relationship(
    State(state): State<Arc<AppState>>,
    auth: Option<Extension<AuthContext>>,
    Path(user_id): Path<String>,
) -> ServerResult<Json<RelationshipDto>> {
    let auth = require_auth(auth.as_deref())?;

    let view = state
        .engine
        .queries()
        .relationship_between(&auth.user_id, &user_id)
        .await?;

    Ok(Json(RelationshipDto::from(view)))
}

/// List pending friend requests addressed to the caller
#[utoipa::path(
    get,
    path = "/api/friends/requests/incoming",
    tag = "friends",
    responses(
        (status = 200, description = "Pending incoming requests, newest first", body = Vec<IncomingRequestDto>),
        (status = 401, description = "No caller identity"),
    )
)]
pub async fn list_incoming_requests(
    State(state): State<Arc<AppState>>,
    auth: Option<Extension<AuthContext>>,
) -> ServerResult<Json<Vec<IncomingRequestDto>>> {
    let auth = require_auth(auth.as_deref())?;

    let rows = state
        .engine
        .queries()
        .list_incoming_pending(&auth.user_id)
        .await?;

    Ok(Json(rows.into_iter().map(IncomingRequestDto::from).collect()))
}
