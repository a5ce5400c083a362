//! Repository for the `usage_logs` table.

use chrono::NaiveDate;
use sqlx::PgPool;
use tomtat_core::types::DbId;

use crate::models::usage_log::UsageLog;

const COLUMNS: &str = "id, user_id, feature, usage_date, created_at";

/// Append-only log of consumed uses.
pub struct UsageLogRepo;

impl UsageLogRepo {
    /// Record one use of `feature` on `day`.
    pub async fn record(
        pool: &PgPool,
        user_id: DbId,
        feature: &str,
        day: NaiveDate,
    ) -> Result<UsageLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO usage_logs (user_id, feature, usage_date)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UsageLog>(&query)
            .bind(user_id)
            .bind(feature)
            .bind(day)
            .fetch_one(pool)
            .await
    }

    /// Number of uses logged for a user on `day`.
    pub async fn count_for_day(
        pool: &PgPool,
        user_id: DbId,
        day: NaiveDate,
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM usage_logs WHERE user_id = $1 AND usage_date = $2")
                .bind(user_id)
                .bind(day)
                .fetch_one(pool)
                .await?;
        Ok(row.0)
    }
}
