use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A tax-filing entity tracked by the firm.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    pub gstin: String,
    pub state: String,
    pub filing_type: String,
    pub is_active: bool,
    pub lead_owner: Option<String>,
    pub default_assigned_to: Option<Uuid>,
    pub rank: Option<String>,
    pub rcm_applicable: bool,
    pub contact_number: Option<String>,
    pub mode_of_filing: Option<String>,
    pub created_at: DateTime<Utc>,
}
