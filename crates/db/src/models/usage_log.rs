//! Usage log model.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;
use tomtat_core::types::{DbId, Timestamp};

/// A row from the `usage_logs` table: one consumed use of a feature.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageLog {
    pub id: DbId,
    pub user_id: DbId,
    pub feature: String,
    pub usage_date: NaiveDate,
    pub created_at: Timestamp,
}
