use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{is_unique_violation, ApiError};
use crate::models::Client;
use crate::response::{ApiResponse, ApiResult, ListData};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateClientRequest {
    pub name: String,
    pub gstin: String,
    #[serde(default)]
    pub state: Option<String>,
    pub filing_type: Option<String>,
    pub is_active: Option<bool>,
    pub lead_owner: Option<String>,
    pub default_assigned_to: Option<Uuid>,
    pub rank: Option<String>,
    pub rcm_applicable: Option<bool>,
    pub contact_number: Option<String>,
    pub mode_of_filing: Option<String>,
}

/// POST /api/clients
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateClientRequest>,
) -> ApiResult<Client> {
    if body.name.trim().is_empty() || body.gstin.trim().is_empty() {
        return Err(ApiError::bad_request("Name and GSTIN are required"));
    }

    let client = sqlx::query_as::<_, Client>(
        "INSERT INTO clients \
         (name, gstin, state, filing_type, is_active, lead_owner, default_assigned_to, rank, \
          rcm_applicable, contact_number, mode_of_filing) \
         VALUES ($1, $2, $3, COALESCE($4, 'Monthly'), COALESCE($5, TRUE), $6, $7, $8, \
                 COALESCE($9, FALSE), $10, $11) \
         RETURNING *",
    )
    .bind(&body.name)
    .bind(&body.gstin)
    .bind(body.state.clone().unwrap_or_default())
    .bind(&body.filing_type)
    .bind(body.is_active)
    .bind(&body.lead_owner)
    .bind(body.default_assigned_to)
    .bind(&body.rank)
    .bind(body.rcm_applicable)
    .bind(&body.contact_number)
    .bind(&body.mode_of_filing)
    .fetch_one(&state.pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            ApiError::bad_request("GSTIN already exists")
        } else {
            ApiError::from(e)
        }
    })?;

    Ok(ApiResponse::created(client))
}

/// GET /api/clients
pub async fn list(State(state): State<AppState>) -> ApiResult<ListData<Client>> {
    let clients =
        sqlx::query_as::<_, Client>("SELECT * FROM clients ORDER BY created_at DESC")
            .fetch_all(&state.pool)
            .await?;

    Ok(ApiResponse::success(ListData::new(clients)))
}

/// GET /api/clients/:id
pub async fn get_by_id(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Client> {
    let client = sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Client not found"))?;

    Ok(ApiResponse::success(client))
}

#[derive(Debug, Deserialize)]
pub struct UpdateClientRequest {
    pub name: String,
    pub gstin: String,
    pub state: Option<String>,
    pub filing_type: Option<String>,
    pub is_active: Option<bool>,
    pub lead_owner: Option<String>,
    pub default_assigned_to: Option<Uuid>,
    pub rank: Option<String>,
    pub rcm_applicable: Option<bool>,
    pub contact_number: Option<String>,
    pub mode_of_filing: Option<String>,
}

/// PUT /api/clients/:id
///
/// Name and GSTIN are required; the optional metadata columns keep their
/// stored value when omitted.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateClientRequest>,
) -> ApiResult<Client> {
    if body.name.trim().is_empty() || body.gstin.trim().is_empty() {
        return Err(ApiError::bad_request("Name and GSTIN are required"));
    }

    let client = sqlx::query_as::<_, Client>(
        "UPDATE clients SET \
         name = $1, gstin = $2, \
         state = COALESCE($3, state), \
         filing_type = COALESCE($4, filing_type), \
         is_active = COALESCE($5, is_active), \
         lead_owner = COALESCE($6, lead_owner), \
         default_assigned_to = COALESCE($7, default_assigned_to), \
         rank = COALESCE($8, rank), \
         rcm_applicable = COALESCE($9, rcm_applicable), \
         contact_number = COALESCE($10, contact_number), \
         mode_of_filing = COALESCE($11, mode_of_filing) \
         WHERE id = $12 RETURNING *",
    )
    .bind(&body.name)
    .bind(&body.gstin)
    .bind(&body.state)
    .bind(&body.filing_type)
    .bind(body.is_active)
    .bind(&body.lead_owner)
    .bind(body.default_assigned_to)
    .bind(&body.rank)
    .bind(body.rcm_applicable)
    .bind(&body.contact_number)
    .bind(&body.mode_of_filing)
    .bind(id)
    .fetch_optional(&state.pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            ApiError::bad_request("GSTIN already exists")
        } else {
            ApiError::from(e)
        }
    })?
    .ok_or_else(|| ApiError::not_found("Client not found"))?;

    Ok(ApiResponse::success(client))
}

/// DELETE /api/clients/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Value> {
    let result = sqlx::query("DELETE FROM clients WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Client not found"));
    }

    Ok(ApiResponse::success(json!({ "message": "Client deleted successfully" })))
}
