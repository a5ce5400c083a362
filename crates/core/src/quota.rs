//! Daily usage quota arithmetic.
//!
//! Each user row stores how many uses were consumed on `usage_reset_date`
//! (`daily_usage_count`) and how many bonus uses were granted that same day
//! (`bonus_uses`). A row whose reset date is not today reads as fully reset;
//! the repository persists the reset lazily on the next write.
//!
//! ```text
//! remaining = max(0, daily_limit(plan) + bonus_uses - used_today)
//! ```
//!
//! Day boundaries are UTC.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::plans::{is_subscription_active, Plan, PlanLimits};
use crate::types::Timestamp;

/// Bonus uses granted by the daily login reward unless overridden in config.
pub const DEFAULT_DAILY_REWARD_BONUS: i32 = 3;

/// Bonus uses credited to a referrer when their code is redeemed.
pub const REFERRAL_REWARD_BONUS: i32 = 5;

/// Quota-relevant columns of a user row.
#[derive(Debug, Clone)]
pub struct UsageSnapshot {
    pub plan: Plan,
    pub subscription_expiry: Option<Timestamp>,
    pub daily_usage_count: i32,
    pub bonus_uses: i32,
    pub usage_reset_date: Option<NaiveDate>,
    pub monthly_usage_count: i32,
    pub last_reward_date: Option<NaiveDate>,
}

/// Usage summary returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageInfo {
    pub can_use: bool,
    pub remaining_uses: i32,
    pub used_today: i32,
    pub daily_limit: i32,
    pub bonus_uses: i32,
    pub monthly_usage: i32,
    pub subscription: String,
    pub reset_date: NaiveDate,
}

/// Result of evaluating a snapshot against the current time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageEvaluation {
    pub info: UsageInfo,
    /// The plan that is actually in force (expired paid plans read as `Free`).
    pub effective_plan: Plan,
    /// The stored daily counters belong to an earlier day.
    pub needs_daily_reset: bool,
    /// The stored monthly counter belongs to an earlier month.
    pub needs_monthly_reset: bool,
    /// The stored paid plan has lapsed and should be downgraded.
    pub needs_downgrade: bool,
}

/// Remaining uses for the day, never negative.
pub fn remaining(daily_limit: i32, bonus_uses: i32, used_today: i32) -> i32 {
    (daily_limit + bonus_uses - used_today).max(0)
}

/// Whether the daily reward can still be claimed on `today`.
pub fn can_claim_reward(last_reward_date: Option<NaiveDate>, today: NaiveDate) -> bool {
    last_reward_date != Some(today)
}

fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

impl UsageSnapshot {
    /// Evaluate the stored counters for `now`, applying the day reset, the
    /// month reset and the expired-subscription downgrade in memory.
    pub fn evaluate(&self, limits: &PlanLimits, now: Timestamp) -> UsageEvaluation {
        let today = now.date_naive();

        let needs_downgrade = !is_subscription_active(self.plan, self.subscription_expiry, now);
        let effective_plan = if needs_downgrade { Plan::Free } else { self.plan };

        let needs_daily_reset = self.usage_reset_date != Some(today);
        let (used_today, bonus_uses) = if needs_daily_reset {
            (0, 0)
        } else {
            (self.daily_usage_count, self.bonus_uses)
        };

        let needs_monthly_reset = match self.usage_reset_date {
            Some(date) => !same_month(date, today),
            None => false,
        };
        let monthly_usage = if needs_monthly_reset {
            0
        } else {
            self.monthly_usage_count
        };

        let daily_limit = limits.daily_limit(effective_plan);
        let remaining_uses = remaining(daily_limit, bonus_uses, used_today);

        UsageEvaluation {
            info: UsageInfo {
                can_use: remaining_uses > 0,
                remaining_uses,
                used_today,
                daily_limit,
                bonus_uses,
                monthly_usage,
                subscription: effective_plan.as_str().to_string(),
                reset_date: today,
            },
            effective_plan,
            needs_daily_reset,
            needs_monthly_reset,
            needs_downgrade,
        }
    }
}
