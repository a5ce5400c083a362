//! Repository for the `summaries` table (history and share links).

use sqlx::PgPool;
use tomtat_core::text::word_count;
use tomtat_core::types::{DbId, Timestamp};

use crate::models::summary::{CreateSummary, Summary};

const COLUMNS: &str = "id, user_id, kind, original_text, result, summary_mode, source, \
    source_url, source_filename, word_count, share_id, share_expires_at, created_at, updated_at";

/// Records returned by the history listing.
pub const HISTORY_PAGE_SIZE: i64 = 50;

/// Records kept per user; older ones are pruned.
pub const HISTORY_RETENTION: i64 = 100;

/// Provides history storage and share-link lookups.
pub struct SummaryRepo;

impl SummaryRepo {
    /// Insert a history record, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateSummary) -> Result<Summary, sqlx::Error> {
        let query = format!(
            "INSERT INTO summaries
                (user_id, kind, original_text, result, summary_mode, source, source_url,
                 source_filename, word_count)
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, 'text'), $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Summary>(&query)
            .bind(input.user_id)
            .bind(input.kind.as_str())
            .bind(&input.original_text)
            .bind(&input.result)
            .bind(&input.summary_mode)
            .bind(&input.source)
            .bind(&input.source_url)
            .bind(&input.source_filename)
            .bind(word_count(&input.original_text))
            .fetch_one(pool)
            .await
    }

    /// The caller's newest records, newest first.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Summary>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM summaries
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2"
        );
        sqlx::query_as::<_, Summary>(&query)
            .bind(user_id)
            .bind(HISTORY_PAGE_SIZE)
            .fetch_all(pool)
            .await
    }

    /// Find a record owned by `user_id`.
    pub async fn find_for_user(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<Summary>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM summaries WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Summary>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Attach a share link to a record owned by `user_id`.
    ///
    /// Returns `None` if the record does not exist or belongs to someone else.
    pub async fn set_share(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
        share_id: &str,
        expires_at: Timestamp,
    ) -> Result<Option<Summary>, sqlx::Error> {
        let query = format!(
            "UPDATE summaries SET share_id = $3, share_expires_at = $4, updated_at = NOW()
             WHERE id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Summary>(&query)
            .bind(id)
            .bind(user_id)
            .bind(share_id)
            .bind(expires_at)
            .fetch_optional(pool)
            .await
    }

    /// Look up a shared record. Expiry is checked by the caller.
    pub async fn find_by_share_id(
        pool: &PgPool,
        share_id: &str,
    ) -> Result<Option<Summary>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM summaries WHERE share_id = $1");
        sqlx::query_as::<_, Summary>(&query)
            .bind(share_id)
            .fetch_optional(pool)
            .await
    }

    /// Delete everything but the newest `HISTORY_RETENTION` records of a user.
    ///
    /// Returns the number of deleted rows.
    pub async fn prune_for_user(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM summaries
             WHERE user_id = $1
               AND id NOT IN (
                   SELECT id FROM summaries
                   WHERE user_id = $1
                   ORDER BY created_at DESC, id DESC
                   LIMIT $2
               )",
        )
        .bind(user_id)
        .bind(HISTORY_RETENTION)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
