//! Rate governor integration
//!
//! Mutation requests pass through the governor before reaching the state
//! machine. The subject is the authenticated user when an identity is
//! attached, and a fingerprint of client IP plus user-agent otherwise, so
//! unauthenticated abuse is counted too. Governed responses always carry
//! the limit headers; denials add `retry-after`.

use std::sync::Arc;

use axum::{
    extract::{MatchedPath, Request, State},
    http::{HeaderMap, HeaderValue, Method},
    middleware::Next,
    response::Response,
};
use corkboard::ratelimit::{RateDecision, RateSubject};
use tracing::debug;

use crate::api::auth::AuthContext;
use crate::error::ServerError;
use crate::state::AppState;

/// Build the rate-limit response headers for a decision
pub fn rate_headers(decision: &RateDecision) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        "x-ratelimit-limit",
        HeaderValue::from_str(&decision.limit.to_string()).unwrap_or(HeaderValue::from_static("0")),
    );
    headers.insert(
        "x-ratelimit-remaining",
        HeaderValue::from_str(&decision.remaining.to_string())
            .unwrap_or(HeaderValue::from_static("0")),
    );
    headers.insert(
        "x-ratelimit-reset",
        HeaderValue::from_str(&decision.reset_at.to_string())
            .unwrap_or(HeaderValue::from_static("0")),
    );
    if let Some(retry_after) = decision.retry_after_secs {
        headers.insert(
            "retry-after",
            HeaderValue::from_str(&retry_after.to_string())
                .unwrap_or(HeaderValue::from_static("1")),
        );
    }
    headers
}

/// The subject a request is counted against
fn subject_for(request: &Request) -> RateSubject {
    if let Some(auth) = request.extensions().get::<AuthContext>() {
        return RateSubject::user(auth.user_id.clone());
    }

    let client_ip = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .unwrap_or("unknown")
        .trim();
    let user_agent = request
        .headers()
        .get(http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    RateSubject::anonymous(client_ip, user_agent)
}

/// Governor middleware over the mutation routes. Reads pass through
/// unguarded.
pub async fn governor_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    if request.method() == Method::GET {
        return Ok(next.run(request).await);
    }

    let route_key = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| format!("{} {}", request.method(), path.as_str()))
        .unwrap_or_else(|| format!("{} {}", request.method(), request.uri().path()));

    let policy = state.rate_policy(&route_key);
    let subject = subject_for(&request);
    let decision = state.engine.governor().check(&route_key, &policy, &subject);

    if !decision.allowed {
        debug!(route_key, "request denied by rate governor");
        return Err(ServerError::RateLimited(decision));
    }

    let mut response = next.run(request).await;
    response.headers_mut().extend(rate_headers(&decision));
    Ok(response)
}
