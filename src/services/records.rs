//! Filing-period record lifecycle: period find-or-create, per-client record
//! generation with duplicate skipping, and bulk partial-update reconciliation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::Period;

/// Outcome of a single record insert. Duplicate detection is a value, not an
/// error path: the generator loop branches on this.
#[derive(Debug, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    AlreadyExists,
}

/// Find-or-create a period by its (month, financial_year) pair.
///
/// No application-level lock: under a concurrent create for the same pair the
/// unique constraint is the backstop. A lost insert race falls through to a
/// final lookup.
pub async fn resolve_period(
    pool: &PgPool,
    month: &str,
    financial_year: &str,
) -> Result<Period, sqlx::Error> {
    let existing = sqlx::query_as::<_, Period>(
        "SELECT * FROM periods WHERE month = $1 AND financial_year = $2",
    )
    .bind(month)
    .bind(financial_year)
    .fetch_optional(pool)
    .await?;

    if let Some(period) = existing {
        return Ok(period);
    }

    let inserted = sqlx::query_as::<_, Period>(
        "INSERT INTO periods (month, financial_year, status) VALUES ($1, $2, 'open') \
         ON CONFLICT (month, financial_year) DO NOTHING RETURNING *",
    )
    .bind(month)
    .bind(financial_year)
    .fetch_optional(pool)
    .await?;

    if let Some(period) = inserted {
        return Ok(period);
    }

    // A concurrent caller created it between our SELECT and INSERT.
    sqlx::query_as::<_, Period>("SELECT * FROM periods WHERE month = $1 AND financial_year = $2")
        .bind(month)
        .bind(financial_year)
        .fetch_one(pool)
        .await
}

/// Insert a pending record for (client, period), reporting a duplicate as
/// `AlreadyExists` instead of an error.
pub async fn insert_pending_record(
    pool: &PgPool,
    client_id: Uuid,
    period_id: Uuid,
) -> Result<InsertOutcome, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO gst_records (client_id, period_id, gstr1_status, gstr3b_status) \
         VALUES ($1, $2, 'pending', 'pending') \
         ON CONFLICT (client_id, period_id) DO NOTHING",
    )
    .bind(client_id)
    .bind(period_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 1 {
        Ok(InsertOutcome::Inserted)
    } else {
        Ok(InsertOutcome::AlreadyExists)
    }
}

#[derive(Debug, Serialize)]
pub struct GenerateSummary {
    pub period: Period,
    pub created: u64,
    pub skipped: u64,
    pub message: String,
}

/// Generate one pending record per active client for the resolved period.
///
/// Partial success is the norm: pre-existing (client, period) rows are
/// counted as skipped, never treated as failures. Any other database error
/// aborts the batch; rows inserted before the failure stay committed (the
/// batch is deliberately not transactional).
pub async fn generate_records(
    pool: &PgPool,
    month: &str,
    financial_year: &str,
) -> Result<GenerateSummary, ApiError> {
    let period = resolve_period(pool, month, financial_year).await?;

    let clients: Vec<(Uuid,)> =
        sqlx::query_as("SELECT id FROM clients WHERE is_active = TRUE")
            .fetch_all(pool)
            .await?;

    if clients.is_empty() {
        return Err(ApiError::bad_request("No active clients found. Add clients first."));
    }

    let mut created = 0u64;
    let mut skipped = 0u64;
    for (client_id,) in clients {
        match insert_pending_record(pool, client_id, period.id).await? {
            InsertOutcome::Inserted => created += 1,
            InsertOutcome::AlreadyExists => skipped += 1,
        }
    }

    tracing::info!(
        period_id = %period.id,
        created,
        skipped,
        "generated GST records"
    );

    let message = format!("Created {} records, skipped {} (already existed)", created, skipped);
    Ok(GenerateSummary { period, created, skipped, message })
}

/// One bulk-update item: a target record id plus a sparse set of fields.
///
/// Double-`Option` distinguishes "key absent" (outer `None`, leave the column
/// untouched) from an explicit `null` (inner `None`, clear the column).
#[derive(Debug, Default, Deserialize)]
pub struct BulkUpdateItem {
    pub id: Option<Uuid>,
    #[serde(default, with = "presence")]
    pub gstr1_status: Option<Option<String>>,
    #[serde(default, with = "presence")]
    pub gstr3b_status: Option<Option<String>>,
    #[serde(default, with = "presence")]
    pub gstr1_filed_date: Option<Option<NaiveDate>>,
    #[serde(default, with = "presence")]
    pub gstr3b_filed_date: Option<Option<NaiveDate>>,
    #[serde(default, with = "presence")]
    pub remarks: Option<Option<String>>,
    #[serde(default, with = "presence")]
    pub assigned_to: Option<Option<Uuid>>,
}

/// Deserializes a present key (possibly `null`) as `Some(inner)`.
mod presence {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

impl BulkUpdateItem {
    pub fn has_updates(&self) -> bool {
        self.gstr1_status.is_some()
            || self.gstr3b_status.is_some()
            || self.gstr1_filed_date.is_some()
            || self.gstr3b_filed_date.is_some()
            || self.remarks.is_some()
            || self.assigned_to.is_some()
    }
}

/// Build the UPDATE statement for one item, or `None` when the item carries
/// no id or no present fields.
fn build_update_query(item: &BulkUpdateItem) -> Option<QueryBuilder<'static, Postgres>> {
    let id = item.id?;
    if !item.has_updates() {
        return None;
    }

    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE gst_records SET ");
    {
        let mut set = qb.separated(", ");
        if let Some(v) = &item.gstr1_status {
            set.push("gstr1_status = ");
            set.push_bind_unseparated(v.clone());
        }
        if let Some(v) = &item.gstr3b_status {
            set.push("gstr3b_status = ");
            set.push_bind_unseparated(v.clone());
        }
        if let Some(v) = &item.gstr1_filed_date {
            set.push("gstr1_filed_date = ");
            set.push_bind_unseparated(*v);
        }
        if let Some(v) = &item.gstr3b_filed_date {
            set.push("gstr3b_filed_date = ");
            set.push_bind_unseparated(*v);
        }
        if let Some(v) = &item.remarks {
            set.push("remarks = ");
            set.push_bind_unseparated(v.clone());
        }
        if let Some(v) = &item.assigned_to {
            set.push("assigned_to = ");
            set.push_bind_unseparated(*v);
        }
    }
    qb.push(" WHERE id = ");
    qb.push_bind(id);
    Some(qb)
}

/// Apply a batch of partial updates, returning how many items resulted in an
/// update that matched a row.
///
/// Counting policy: `updated` requires the issued UPDATE to have matched a
/// row, so a well-formed item pointing at a vanished record does not count.
///
/// Items are processed sequentially and independently. An item without an id
/// or without any present field is a no-op; an id that matches no row is
/// skipped without counting. A database error aborts the remainder of the
/// batch (already-applied items stay committed); a stale assignee reference
/// surfaces as a validation error rather than a raw storage failure.
pub async fn bulk_update(pool: &PgPool, items: &[BulkUpdateItem]) -> Result<u64, ApiError> {
    let mut updated = 0u64;
    for item in items {
        let Some(mut qb) = build_update_query(item) else {
            continue;
        };
        let result = qb.build().execute(pool).await.map_err(|e| {
            if e.as_database_error().is_some_and(|d| d.is_foreign_key_violation()) {
                ApiError::bad_request("Invalid assignee reference in bulk update item")
            } else {
                ApiError::from(e)
            }
        })?;
        if result.rows_affected() > 0 {
            updated += 1;
        }
    }
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(v: serde_json::Value) -> BulkUpdateItem {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn absent_key_is_not_an_update() {
        let it = item(json!({ "id": Uuid::new_v4() }));
        assert!(!it.has_updates());
    }

    #[test]
    fn explicit_null_counts_as_present() {
        let it = item(json!({ "id": Uuid::new_v4(), "remarks": null }));
        assert!(it.has_updates());
        assert_eq!(it.remarks, Some(None));
    }

    #[test]
    fn value_is_present() {
        let it = item(json!({ "id": Uuid::new_v4(), "gstr1_status": "filed" }));
        assert_eq!(it.gstr1_status, Some(Some("filed".to_string())));
        assert!(it.gstr3b_status.is_none());
    }

    #[test]
    fn item_without_id_builds_no_query() {
        let it = item(json!({ "remarks": "x" }));
        assert!(build_update_query(&it).is_none());
    }

    #[test]
    fn item_without_fields_builds_no_query() {
        let it = item(json!({ "id": Uuid::new_v4() }));
        assert!(build_update_query(&it).is_none());
    }

    #[test]
    fn update_sql_includes_only_present_fields() {
        let it = item(json!({ "id": Uuid::new_v4(), "remarks": "checked", "gstr1_status": "filed" }));
        let qb = build_update_query(&it).unwrap();
        let sql = qb.sql();
        assert_eq!(
            sql,
            "UPDATE gst_records SET gstr1_status = $1, remarks = $2 WHERE id = $3"
        );
    }

    #[test]
    fn filed_date_parses_from_iso_string() {
        let it = item(json!({ "id": Uuid::new_v4(), "gstr1_filed_date": "2025-04-11" }));
        assert_eq!(
            it.gstr1_filed_date,
            Some(Some(NaiveDate::from_ymd_opt(2025, 4, 11).unwrap()))
        );
    }
}
