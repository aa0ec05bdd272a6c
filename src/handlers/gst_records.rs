use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{is_unique_violation, ApiError};
use crate::models::{GstRecord, GstRecordWithContext};
use crate::response::{ApiResponse, ApiResult, ListData};
use crate::services::records::{bulk_update, generate_records, BulkUpdateItem, GenerateSummary};
use crate::state::AppState;

const DUPLICATE_RECORD: &str = "A record already exists for this client in the specified period";

#[derive(Debug, Deserialize)]
pub struct CreateRecordRequest {
    pub client_id: Uuid,
    pub period_id: Uuid,
    pub gstr1_status: Option<String>,
    pub gstr3b_status: Option<String>,
    pub gstr1_filed_date: Option<NaiveDate>,
    pub gstr3b_filed_date: Option<NaiveDate>,
    pub remarks: Option<String>,
    pub assigned_to: Option<Uuid>,
}

/// POST /api/gst-records
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateRecordRequest>,
) -> ApiResult<GstRecord> {
    let record = sqlx::query_as::<_, GstRecord>(
        "INSERT INTO gst_records \
         (client_id, period_id, gstr1_status, gstr3b_status, gstr1_filed_date, gstr3b_filed_date, \
          remarks, assigned_to) \
         VALUES ($1, $2, COALESCE($3, 'pending'), COALESCE($4, 'pending'), $5, $6, $7, $8) \
         RETURNING *",
    )
    .bind(body.client_id)
    .bind(body.period_id)
    .bind(&body.gstr1_status)
    .bind(&body.gstr3b_status)
    .bind(body.gstr1_filed_date)
    .bind(body.gstr3b_filed_date)
    .bind(&body.remarks)
    .bind(body.assigned_to)
    .fetch_one(&state.pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            ApiError::bad_request(DUPLICATE_RECORD)
        } else {
            ApiError::from(e)
        }
    })?;

    Ok(ApiResponse::created(record))
}

#[derive(Debug, Deserialize)]
pub struct RecordsQuery {
    pub period_id: Option<Uuid>,
}

/// GET /api/gst-records?period_id=
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<RecordsQuery>,
) -> ApiResult<ListData<GstRecordWithContext>> {
    const BASE: &str = "SELECT r.*, c.name AS client_name, p.month, p.financial_year \
                        FROM gst_records r \
                        JOIN clients c ON r.client_id = c.id \
                        JOIN periods p ON r.period_id = p.id";

    let records = match query.period_id {
        Some(period_id) => {
            let sql = format!("{} WHERE r.period_id = $1 ORDER BY c.name ASC", BASE);
            sqlx::query_as::<_, GstRecordWithContext>(&sql)
                .bind(period_id)
                .fetch_all(&state.pool)
                .await?
        }
        None => {
            let sql = format!("{} ORDER BY c.name ASC", BASE);
            sqlx::query_as::<_, GstRecordWithContext>(&sql)
                .fetch_all(&state.pool)
                .await?
        }
    };

    Ok(ApiResponse::success(ListData::new(records)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateRecordRequest {
    pub gstr1_status: Option<String>,
    pub gstr3b_status: Option<String>,
    pub gstr1_filed_date: Option<NaiveDate>,
    pub gstr3b_filed_date: Option<NaiveDate>,
    pub remarks: Option<String>,
}

/// PUT /api/gst-records/:id — full overwrite of the core filing fields.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateRecordRequest>,
) -> ApiResult<GstRecord> {
    let record = sqlx::query_as::<_, GstRecord>(
        "UPDATE gst_records SET \
         gstr1_status = $1, gstr3b_status = $2, gstr1_filed_date = $3, gstr3b_filed_date = $4, \
         remarks = $5 \
         WHERE id = $6 RETURNING *",
    )
    .bind(&body.gstr1_status)
    .bind(&body.gstr3b_status)
    .bind(body.gstr1_filed_date)
    .bind(body.gstr3b_filed_date)
    .bind(&body.remarks)
    .bind(id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| ApiError::not_found("GST record not found"))?;

    Ok(ApiResponse::success(record))
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub month: String,
    pub financial_year: String,
}

/// POST /api/gst-records/generate
pub async fn generate(
    State(state): State<AppState>,
    Json(body): Json<GenerateRequest>,
) -> ApiResult<GenerateSummary> {
    if body.month.trim().is_empty() || body.financial_year.trim().is_empty() {
        return Err(ApiError::bad_request("month and financial_year are required"));
    }

    let summary = generate_records(&state.pool, &body.month, &body.financial_year).await?;
    Ok(ApiResponse::created(summary))
}

#[derive(Debug, Deserialize)]
pub struct BulkUpdateRequest {
    pub items: Vec<BulkUpdateItem>,
}

#[derive(Debug, Serialize)]
pub struct BulkUpdateSummary {
    pub updated: u64,
}

/// POST /api/gst-records/bulk
pub async fn bulk(
    State(state): State<AppState>,
    Json(body): Json<BulkUpdateRequest>,
) -> ApiResult<BulkUpdateSummary> {
    let updated = bulk_update(&state.pool, &body.items).await?;
    Ok(ApiResponse::success(BulkUpdateSummary { updated }))
}
