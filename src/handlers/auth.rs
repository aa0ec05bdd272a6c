use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::{hash_password, issue_token, verify_password};
use crate::error::{is_unique_violation, ApiError};
use crate::models::{PublicUser, User};
use crate::response::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthPayload {
    pub user: PublicUser,
    pub token: String,
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> ApiResult<AuthPayload> {
    if body.name.trim().is_empty()
        || body.email.trim().is_empty()
        || body.password.is_empty()
        || body.role.trim().is_empty()
    {
        return Err(ApiError::bad_request("Missing required fields"));
    }

    let password_hash = hash_password(body.password).await?;

    let user = sqlx::query_as::<_, PublicUser>(
        "INSERT INTO users (name, email, password_hash, role) VALUES ($1, $2, $3, $4) \
         RETURNING id, name, email, role, active, created_at",
    )
    .bind(&body.name)
    .bind(&body.email)
    .bind(&password_hash)
    .bind(&body.role)
    .fetch_one(&state.pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            ApiError::bad_request("Email already exists")
        } else {
            ApiError::from(e)
        }
    })?;

    let token = issue_token(user.id, &state.config.jwt_secret, state.config.jwt_expiry_hours)
        .map_err(|e| {
            tracing::error!("token generation failed: {}", e);
            ApiError::Internal("Failed to issue token".to_string())
        })?;

    Ok(ApiResponse::created(AuthPayload { user, token }))
}

/// POST /api/auth/login
///
/// One generic 401 for both unknown email and wrong password.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<AuthPayload> {
    if body.email.trim().is_empty() || body.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(&body.email)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    let matches = verify_password(body.password, user.password_hash.clone()).await?;
    if !matches {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let token = issue_token(user.id, &state.config.jwt_secret, state.config.jwt_expiry_hours)
        .map_err(|e| {
            tracing::error!("token generation failed: {}", e);
            ApiError::Internal("Failed to issue token".to_string())
        })?;

    Ok(ApiResponse::success(AuthPayload { user: user.into(), token }))
}
