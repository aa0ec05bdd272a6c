use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A (month, financial year) reporting window. The pair is unique.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Period {
    pub id: Uuid,
    pub month: String,
    pub financial_year: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}
