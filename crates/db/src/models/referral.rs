//! Referral model.

use serde::Serialize;
use sqlx::FromRow;
use tomtat_core::types::{DbId, Timestamp};

/// A row from the `referrals` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Referral {
    pub id: DbId,
    pub referrer_id: DbId,
    pub referee_id: DbId,
    pub referral_code: String,
    pub status: String,
    pub bonus_awarded: i32,
    pub created_at: Timestamp,
}
