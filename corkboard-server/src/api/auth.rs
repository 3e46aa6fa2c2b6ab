//! Caller identity for the Corkboard API
//!
//! Authentication itself belongs to the external auth service; this module
//! only validates the bearer tokens it issues and attaches the caller's
//! identity to the request. Handlers that mutate state require an identity
//! and reject requests without one.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use headers::{Authorization, HeaderMapExt, authorization::Bearer};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{error::ServerError, state::AppState};

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// Issued at timestamp
    pub iat: usize,
    /// Expiration timestamp
    pub exp: usize,
}

/// Caller identity extracted from a validated token
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// User ID
    pub user_id: String,
}

/// Identity middleware: validates a bearer token when present and attaches
/// the [`AuthContext`]. Requests without a token pass through anonymously;
/// handlers that need an identity reject them.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    if let Some(auth_header) = headers.typed_get::<Authorization<Bearer>>() {
        let auth_context = validate_token(auth_header.token(), &state.config.jwt_secret)?;
        request.extensions_mut().insert(auth_context);
    }

    Ok(next.run(request).await)
}

/// Validate a token and extract the caller identity
pub fn validate_token(token: &str, secret: &str) -> Result<AuthContext, ServerError> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| ServerError::Auth(format!("Invalid token: {e}")))?;

    Ok(AuthContext {
        user_id: decoded.claims.sub,
    })
}

/// Issue a token for `user_id`, valid for `hours`. Used by tests and local
/// development; production tokens come from the external auth service.
pub fn issue_token(user_id: &str, secret: &str, hours: u64) -> Result<String, ServerError> {
    let now = chrono::Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now,
        exp: now + (hours * 3600) as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ServerError::Internal(format!("Failed to issue token: {e}")))
}

/// Require an identity, rejecting anonymous callers
pub fn require_auth(auth: Option<&AuthContext>) -> Result<&AuthContext, ServerError> {
    auth.ok_or_else(|| ServerError::Auth("Missing authorization header".to_string()))
}
