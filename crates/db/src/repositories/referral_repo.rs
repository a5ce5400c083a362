//! Repository for the `referrals` table.

use chrono::NaiveDate;
use sqlx::PgPool;
use tomtat_core::types::DbId;

use crate::models::referral::Referral;
use crate::models::status::ReferralStatus;
use crate::repositories::user_repo::UserRepo;

const COLUMNS: &str =
    "id, referrer_id, referee_id, referral_code, status, bonus_awarded, created_at";

/// Provides referral redemption.
pub struct ReferralRepo;

impl ReferralRepo {
    /// The referral a user redeemed, if any.
    pub async fn find_by_referee(
        pool: &PgPool,
        referee_id: DbId,
    ) -> Result<Option<Referral>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM referrals WHERE referee_id = $1");
        sqlx::query_as::<_, Referral>(&query)
            .bind(referee_id)
            .fetch_optional(pool)
            .await
    }

    /// Record a redemption and credit the referrer in one transaction.
    ///
    /// Returns `None` if the referee already redeemed a code.
    pub async fn create_completed(
        pool: &PgPool,
        referrer_id: DbId,
        referee_id: DbId,
        code: &str,
        bonus: i32,
        today: NaiveDate,
    ) -> Result<Option<Referral>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO referrals (referrer_id, referee_id, referral_code, status, bonus_awarded)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (referee_id) DO NOTHING
             RETURNING {COLUMNS}"
        );
        let Some(referral) = sqlx::query_as::<_, Referral>(&query)
            .bind(referrer_id)
            .bind(referee_id)
            .bind(code)
            .bind(ReferralStatus::Completed.as_str())
            .bind(bonus)
            .fetch_optional(&mut *tx)
            .await?
        else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query(
            "UPDATE users SET referrals_count = referrals_count + 1, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(referrer_id)
        .execute(&mut *tx)
        .await?;
        UserRepo::add_bonus_uses(&mut *tx, referrer_id, bonus, today).await?;

        tx.commit().await?;
        Ok(Some(referral))
    }
}
