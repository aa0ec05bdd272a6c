use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::hash_password;
use crate::error::{is_unique_violation, ApiError};
use crate::models::PublicUser;
use crate::response::{ApiResponse, ApiResult, ListData};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StaffQuery {
    pub q: Option<String>,
    pub search: Option<String>,
}

/// GET /api/staff
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<StaffQuery>,
) -> ApiResult<ListData<PublicUser>> {
    let search = query.q.or(query.search);

    let users = match search {
        Some(term) if !term.trim().is_empty() => {
            sqlx::query_as::<_, PublicUser>(
                "SELECT id, name, email, role, active, created_at FROM users \
                 WHERE name ILIKE $1 OR email ILIKE $1 ORDER BY created_at DESC",
            )
            .bind(format!("%{}%", term))
            .fetch_all(&state.pool)
            .await?
        }
        _ => {
            sqlx::query_as::<_, PublicUser>(
                "SELECT id, name, email, role, active, created_at FROM users \
                 ORDER BY created_at DESC",
            )
            .fetch_all(&state.pool)
            .await?
        }
    };

    Ok(ApiResponse::success(ListData::new(users)))
}

#[derive(Debug, Deserialize)]
pub struct CreateStaffRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// POST /api/staff (admin only)
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateStaffRequest>,
) -> ApiResult<PublicUser> {
    if body.name.trim().is_empty()
        || body.email.trim().is_empty()
        || body.password.is_empty()
        || body.role.trim().is_empty()
    {
        return Err(ApiError::bad_request("Missing required fields"));
    }

    let password_hash = hash_password(body.password).await?;

    let user = sqlx::query_as::<_, PublicUser>(
        "INSERT INTO users (name, email, password_hash, role, active) VALUES ($1, $2, $3, $4, $5) \
         RETURNING id, name, email, role, active, created_at",
    )
    .bind(&body.name)
    .bind(&body.email)
    .bind(&password_hash)
    .bind(&body.role)
    .bind(body.active)
    .fetch_one(&state.pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            ApiError::bad_request("Email already exists")
        } else {
            ApiError::from(e)
        }
    })?;

    Ok(ApiResponse::created(user))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStaffRequest {
    pub name: String,
    pub email: String,
    pub role: String,
    pub active: bool,
    pub password: Option<String>,
}

/// PUT /api/staff/:id (admin only)
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateStaffRequest>,
) -> ApiResult<PublicUser> {
    if body.name.trim().is_empty() || body.email.trim().is_empty() || body.role.trim().is_empty() {
        return Err(ApiError::bad_request("Missing required fields"));
    }

    let result = match body.password {
        Some(password) if !password.is_empty() => {
            let password_hash = hash_password(password).await?;
            sqlx::query_as::<_, PublicUser>(
                "UPDATE users SET name = $1, email = $2, role = $3, active = $4, password_hash = $5 \
                 WHERE id = $6 RETURNING id, name, email, role, active, created_at",
            )
            .bind(&body.name)
            .bind(&body.email)
            .bind(&body.role)
            .bind(body.active)
            .bind(&password_hash)
            .bind(id)
            .fetch_optional(&state.pool)
            .await
        }
        _ => {
            sqlx::query_as::<_, PublicUser>(
                "UPDATE users SET name = $1, email = $2, role = $3, active = $4 \
                 WHERE id = $5 RETURNING id, name, email, role, active, created_at",
            )
            .bind(&body.name)
            .bind(&body.email)
            .bind(&body.role)
            .bind(body.active)
            .bind(id)
            .fetch_optional(&state.pool)
            .await
        }
    };

    let user = result
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::bad_request("Email already exists")
            } else {
                ApiError::from(e)
            }
        })?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(ApiResponse::success(user))
}

/// DELETE /api/staff/:id (admin only)
pub async fn delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Value> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("User not found"));
    }

    Ok(ApiResponse::success(json!({ "message": "User deleted successfully" })))
}
