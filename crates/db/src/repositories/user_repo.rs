//! Repository for the `users` table.
//!
//! Quota counters are only ever changed with conditional single-statement
//! updates, so concurrent requests for the same user cannot overspend.

use chrono::NaiveDate;
use sqlx::PgPool;
use tomtat_core::plans::Plan;
use tomtat_core::types::{DbId, Timestamp};

use crate::models::user::{SyncUser, UpdateProfile, User};

/// Column list shared across queries to avoid repetition.
pub(crate) const COLUMNS: &str = "id, external_id, email, full_name, image_url, subscription, \
    subscription_expiry, daily_usage_count, bonus_uses, monthly_usage_count, usage_reset_date, \
    last_reward_date, referral_code, referrals_count, created_at, updated_at";

/// `col` as it reads on day `today`: zero when the stored counters belong
/// to another day.
fn on_day(col: &str, today: &str) -> String {
    format!("CASE WHEN usage_reset_date = {today} THEN {col} ELSE 0 END")
}

/// Monthly counter as it reads on day `today`.
fn monthly_on_day(today: &str) -> String {
    format!(
        "CASE WHEN date_trunc('month', usage_reset_date) = date_trunc('month', {today}::date) \
         THEN monthly_usage_count ELSE 0 END"
    )
}

/// Provides lookups and quota bookkeeping for users.
pub struct UserRepo;

impl UserRepo {
    /// Find a user by the identity provider's subject id.
    pub async fn find_by_external_id(
        pool: &PgPool,
        external_id: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE external_id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(external_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email (case-insensitive).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE lower(email) = lower($1) LIMIT 1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_referral_code(
        pool: &PgPool,
        code: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE referral_code = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(code)
            .fetch_optional(pool)
            .await
    }

    /// Return the user for `external_id`, inserting a Free row if none exists.
    ///
    /// `referral_code` is only used for the insert.
    pub async fn get_or_create(
        pool: &PgPool,
        external_id: &str,
        email: Option<&str>,
        referral_code: &str,
        today: NaiveDate,
    ) -> Result<User, sqlx::Error> {
        // The no-op update makes RETURNING yield the existing row on conflict.
        let query = format!(
            "INSERT INTO users (external_id, email, referral_code, usage_reset_date)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (external_id) DO UPDATE
                SET email = COALESCE(users.email, EXCLUDED.email)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(external_id)
            .bind(email)
            .bind(referral_code)
            .bind(today)
            .fetch_one(pool)
            .await
    }

    /// Create or refresh a user from identity-provider data.
    ///
    /// New users start on Free with today's reset date. Existing users get
    /// their email replaced and name/avatar filled in when provided.
    pub async fn upsert_from_sync(
        pool: &PgPool,
        external_id: &str,
        input: &SyncUser,
        referral_code: &str,
        today: NaiveDate,
    ) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (external_id, email, full_name, image_url, referral_code, usage_reset_date)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (external_id) DO UPDATE SET
                email = EXCLUDED.email,
                full_name = COALESCE(EXCLUDED.full_name, users.full_name),
                image_url = COALESCE(EXCLUDED.image_url, users.image_url),
                updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(external_id)
            .bind(&input.email)
            .bind(&input.full_name)
            .bind(&input.image_url)
            .bind(referral_code)
            .bind(today)
            .fetch_one(pool)
            .await
    }

    /// Apply a profile patch. Only non-`None` fields are written.
    pub async fn update_profile(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProfile,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                full_name = COALESCE($2, full_name),
                image_url = COALESCE($3, image_url),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.full_name)
            .bind(&input.image_url)
            .fetch_optional(pool)
            .await
    }

    /// Persist the day rollover if the stored reset date is not `today`.
    ///
    /// Returns `true` if a row was rolled over.
    pub async fn reset_daily_usage(
        pool: &PgPool,
        id: DbId,
        today: NaiveDate,
    ) -> Result<bool, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                daily_usage_count = 0,
                bonus_uses = 0,
                monthly_usage_count = {},
                usage_reset_date = $2,
                updated_at = NOW()
             WHERE id = $1 AND usage_reset_date IS DISTINCT FROM $2",
            monthly_on_day("$2")
        );
        let result = sqlx::query(&query)
            .bind(id)
            .bind(today)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Consume one use if today's allowance is not exhausted.
    ///
    /// The availability check and the increment happen in one statement.
    /// Returns `None` when no use was available.
    pub async fn try_consume(
        pool: &PgPool,
        id: DbId,
        daily_limit: i32,
        today: NaiveDate,
    ) -> Result<Option<User>, sqlx::Error> {
        Self::reset_daily_usage(pool, id, today).await?;
        let query = format!(
            "UPDATE users SET
                daily_usage_count = daily_usage_count + 1,
                monthly_usage_count = monthly_usage_count + 1,
                updated_at = NOW()
             WHERE id = $1
               AND usage_reset_date = $3
               AND daily_usage_count < $2 + bonus_uses
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(daily_limit)
            .bind(today)
            .fetch_optional(pool)
            .await
    }

    /// Grant the daily login reward once per `today`.
    ///
    /// Returns `None` if the reward was already claimed today.
    pub async fn grant_daily_reward(
        pool: &PgPool,
        id: DbId,
        bonus: i32,
        today: NaiveDate,
    ) -> Result<Option<User>, sqlx::Error> {
        Self::reset_daily_usage(pool, id, today).await?;
        let query = format!(
            "UPDATE users SET
                bonus_uses = bonus_uses + $2,
                last_reward_date = $3,
                updated_at = NOW()
             WHERE id = $1 AND last_reward_date IS DISTINCT FROM $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(bonus)
            .bind(today)
            .fetch_optional(pool)
            .await
    }

    /// Add bonus uses to today's allowance.
    pub async fn add_bonus_uses<'e, E>(
        executor: E,
        id: DbId,
        amount: i32,
        today: NaiveDate,
    ) -> Result<(), sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let query = format!(
            "UPDATE users SET
                daily_usage_count = {},
                bonus_uses = {} + $2,
                monthly_usage_count = {},
                usage_reset_date = $3,
                updated_at = NOW()
             WHERE id = $1",
            on_day("daily_usage_count", "$3"),
            on_day("bonus_uses", "$3"),
            monthly_on_day("$3"),
        );
        sqlx::query(&query)
            .bind(id)
            .bind(amount)
            .bind(today)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Set the plan and expiry after a successful purchase.
    pub async fn apply_subscription<'e, E>(
        executor: E,
        id: DbId,
        plan: Plan,
        expiry: Timestamp,
    ) -> Result<User, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let query = format!(
            "UPDATE users SET subscription = $2, subscription_expiry = $3, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(plan.as_str())
            .bind(expiry)
            .fetch_one(executor)
            .await
    }

    /// Drop a lapsed paid plan back to Free. Returns `true` if a row changed.
    ///
    /// The expiry is checked again in the `WHERE` clause, so a renewal that
    /// committed after the caller read the row is left alone.
    pub async fn downgrade_to_free(
        pool: &PgPool,
        id: DbId,
        now: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET subscription = 'Free', subscription_expiry = NULL, updated_at = NOW()
             WHERE id = $1 AND subscription <> 'Free'
               AND (subscription_expiry IS NULL OR subscription_expiry <= $2)",
        )
        .bind(id)
        .bind(now)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
