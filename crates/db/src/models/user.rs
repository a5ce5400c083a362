//! User entity model and DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tomtat_core::plans::Plan;
use tomtat_core::quota::UsageSnapshot;
use tomtat_core::types::{DbId, Timestamp};

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: DbId,
    pub external_id: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub image_url: Option<String>,
    pub subscription: String,
    pub subscription_expiry: Option<Timestamp>,
    pub daily_usage_count: i32,
    pub bonus_uses: i32,
    pub monthly_usage_count: i32,
    pub usage_reset_date: Option<NaiveDate>,
    pub last_reward_date: Option<NaiveDate>,
    pub referral_code: String,
    pub referrals_count: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    /// Stored plan, unknown values read as `Free`.
    pub fn plan(&self) -> Plan {
        Plan::parse(&self.subscription)
    }

    /// Quota-relevant columns for evaluation in `tomtat_core::quota`.
    pub fn usage_snapshot(&self) -> UsageSnapshot {
        UsageSnapshot {
            plan: self.plan(),
            subscription_expiry: self.subscription_expiry,
            daily_usage_count: self.daily_usage_count,
            bonus_uses: self.bonus_uses,
            usage_reset_date: self.usage_reset_date,
            monthly_usage_count: self.monthly_usage_count,
            last_reward_date: self.last_reward_date,
        }
    }
}

/// Identity data pushed by the client after login.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncUser {
    pub email: String,
    pub full_name: Option<String>,
    pub image_url: Option<String>,
}

/// DTO for a self-service profile update. Quota and plan columns are not editable.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfile {
    pub full_name: Option<String>,
    pub image_url: Option<String>,
}
