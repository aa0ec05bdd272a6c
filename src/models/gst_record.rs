use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// One client's filing status for one period. At most one row exists per
/// (client_id, period_id) pair.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GstRecord {
    pub id: Uuid,
    pub client_id: Uuid,
    pub period_id: Uuid,
    pub gstr1_status: Option<String>,
    pub gstr3b_status: Option<String>,
    pub gstr1_filed_date: Option<NaiveDate>,
    pub gstr3b_filed_date: Option<NaiveDate>,
    pub remarks: Option<String>,
    pub assigned_to: Option<Uuid>,
    pub gstr1_tally_received: bool,
    pub gstr1_entered_in_tally: bool,
    pub gstr1_nil_return: bool,
    pub gstr3b_tally_received: bool,
    pub gstr3b_entered_in_tally: bool,
    pub gstr3b_nil_return: bool,
    pub reconciliation_status: Option<String>,
    pub notices_orders: bool,
    pub bills_pending: bool,
    pub tax_liability: Option<String>,
    pub comments: Option<String>,
    pub billing_status: Option<String>,
    pub bill_sent: bool,
    pub created_at: DateTime<Utc>,
}

/// Record joined with its client name and period labels, as returned by the
/// list endpoint.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GstRecordWithContext {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub record: GstRecord,
    pub client_name: String,
    pub month: String,
    pub financial_year: String,
}
