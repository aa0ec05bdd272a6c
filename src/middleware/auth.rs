use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::verify_token;
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated user context attached to the request after the auth gate.
#[derive(Debug, Clone, Serialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub active: bool,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

/// Auth gate: bearer token -> verified user id -> live user row.
///
/// Missing or invalid tokens and vanished users are all 401 with a generic
/// message. A deactivated account is 403: the credential is valid but the
/// account is administratively disabled.
pub async fn require_auth(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&headers)
        .ok_or_else(|| ApiError::unauthorized("Not authorized, no token provided"))?;

    let user_id = verify_token(token, &state.config.jwt_secret)
        .map_err(|_| ApiError::unauthorized("Not authorized, token failed"))?;

    let user = sqlx::query_as::<_, (Uuid, String, String, String, bool)>(
        "SELECT id, name, email, role, active FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| ApiError::unauthorized("User no longer exists"))?;

    let (id, name, email, role, active) = user;
    if !active {
        return Err(ApiError::forbidden("Account is deactivated"));
    }

    request.extensions_mut().insert(AuthUser { id, name, email, role, active });
    Ok(next.run(request).await)
}

/// Role guard: runs after `require_auth` and admits only admins.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(|| ApiError::unauthorized("Not authorized"))?;

    if !user.is_admin() {
        return Err(ApiError::forbidden("Access denied: Requires Admin role"));
    }

    Ok(next.run(request).await)
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get("authorization")?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}
