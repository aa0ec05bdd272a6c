use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Key/value entry in an advisory controlled vocabulary (e.g. allowed status
/// values). Values are lowercased on insert; nothing cross-checks record
/// statuses against them.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Setting {
    pub id: Uuid,
    pub key: String,
    pub value: String,
    pub created_at: DateTime<Utc>,
}
