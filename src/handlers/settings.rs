use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{is_unique_violation, ApiError};
use crate::models::Setting;
use crate::response::{ApiResponse, ApiResult, ListData};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SettingsQuery {
    pub key: Option<String>,
}

/// GET /api/settings?key=
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<SettingsQuery>,
) -> ApiResult<ListData<Setting>> {
    let settings = match query.key {
        Some(key) => {
            sqlx::query_as::<_, Setting>(
                "SELECT * FROM settings WHERE key = $1 ORDER BY created_at ASC",
            )
            .bind(key)
            .fetch_all(&state.pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, Setting>("SELECT * FROM settings ORDER BY created_at ASC")
                .fetch_all(&state.pool)
                .await?
        }
    };

    Ok(ApiResponse::success(ListData::new(settings)))
}

#[derive(Debug, Deserialize)]
pub struct CreateSettingRequest {
    pub key: String,
    pub value: String,
}

/// POST /api/settings — values are normalized to lowercase.
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateSettingRequest>,
) -> ApiResult<Setting> {
    if body.key.trim().is_empty() || body.value.trim().is_empty() {
        return Err(ApiError::bad_request("key and value are required"));
    }

    let setting = sqlx::query_as::<_, Setting>(
        "INSERT INTO settings (key, value) VALUES ($1, $2) RETURNING *",
    )
    .bind(&body.key)
    .bind(body.value.to_lowercase())
    .fetch_one(&state.pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            ApiError::bad_request("This status already exists")
        } else {
            ApiError::from(e)
        }
    })?;

    Ok(ApiResponse::created(setting))
}

/// DELETE /api/settings/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Value> {
    let result = sqlx::query("DELETE FROM settings WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Setting not found"));
    }

    Ok(ApiResponse::success(json!({ "message": "Setting deleted" })))
}
