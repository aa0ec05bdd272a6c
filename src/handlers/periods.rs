use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{is_unique_violation, ApiError};
use crate::models::Period;
use crate::response::{ApiResponse, ApiResult, ListData};
use crate::state::AppState;

const DUPLICATE_PERIOD: &str = "Period already exists for this month and financial year";

#[derive(Debug, Deserialize)]
pub struct CreatePeriodRequest {
    pub month: String,
    pub financial_year: String,
    pub status: Option<String>,
}

/// POST /api/periods
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreatePeriodRequest>,
) -> ApiResult<Period> {
    if body.month.trim().is_empty() || body.financial_year.trim().is_empty() {
        return Err(ApiError::bad_request("Month and financial_year are required"));
    }

    let period = sqlx::query_as::<_, Period>(
        "INSERT INTO periods (month, financial_year, status) VALUES ($1, $2, COALESCE($3, 'open')) \
         RETURNING *",
    )
    .bind(&body.month)
    .bind(&body.financial_year)
    .bind(&body.status)
    .fetch_one(&state.pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            ApiError::bad_request(DUPLICATE_PERIOD)
        } else {
            ApiError::from(e)
        }
    })?;

    Ok(ApiResponse::created(period))
}

/// GET /api/periods
pub async fn list(State(state): State<AppState>) -> ApiResult<ListData<Period>> {
    let periods =
        sqlx::query_as::<_, Period>("SELECT * FROM periods ORDER BY created_at DESC")
            .fetch_all(&state.pool)
            .await?;

    Ok(ApiResponse::success(ListData::new(periods)))
}

#[derive(Debug, Deserialize)]
pub struct UpdatePeriodRequest {
    pub month: String,
    pub financial_year: String,
    pub status: String,
}

/// PUT /api/periods/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdatePeriodRequest>,
) -> ApiResult<Period> {
    if body.month.trim().is_empty()
        || body.financial_year.trim().is_empty()
        || body.status.trim().is_empty()
    {
        return Err(ApiError::bad_request("Month, financial_year, and status are required"));
    }

    let period = sqlx::query_as::<_, Period>(
        "UPDATE periods SET month = $1, financial_year = $2, status = $3 WHERE id = $4 RETURNING *",
    )
    .bind(&body.month)
    .bind(&body.financial_year)
    .bind(&body.status)
    .bind(id)
    .fetch_optional(&state.pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            ApiError::bad_request(DUPLICATE_PERIOD)
        } else {
            ApiError::from(e)
        }
    })?
    .ok_or_else(|| ApiError::not_found("Period not found"))?;

    Ok(ApiResponse::success(period))
}

/// DELETE /api/periods/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Value> {
    let result = sqlx::query("DELETE FROM periods WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Period not found"));
    }

    Ok(ApiResponse::success(json!({ "message": "Period deleted successfully" })))
}
