//! Subscription plans, daily limits and purchasable packages.
//!
//! Plan names are stored verbatim in `users.subscription` and must match the
//! CHECK constraint in the `create_users` migration.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Subscription tier of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Plan {
    Free,
    Trial,
    Pro,
}

impl Plan {
    /// Database / wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Plan::Free => "Free",
            Plan::Trial => "Trial",
            Plan::Pro => "Pro",
        }
    }

    /// Parse a stored plan name. Unknown values fall back to `Free`.
    pub fn parse(s: &str) -> Self {
        match s {
            "Trial" => Plan::Trial,
            "Pro" => Plan::Pro,
            _ => Plan::Free,
        }
    }

    /// Whether the plan is paid and therefore carries an expiry.
    pub fn is_paid(self) -> bool {
        !matches!(self, Plan::Free)
    }
}

/// Default daily uses for the `Free` plan.
pub const DEFAULT_FREE_DAILY_LIMIT: i32 = 5;
/// Default daily uses for the `Trial` plan.
pub const DEFAULT_TRIAL_DAILY_LIMIT: i32 = 15;
/// Default daily uses for the `Pro` plan.
pub const DEFAULT_PRO_DAILY_LIMIT: i32 = 100;

/// Daily use allowance per plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanLimits {
    pub free: i32,
    pub trial: i32,
    pub pro: i32,
}

impl Default for PlanLimits {
    fn default() -> Self {
        Self {
            free: DEFAULT_FREE_DAILY_LIMIT,
            trial: DEFAULT_TRIAL_DAILY_LIMIT,
            pro: DEFAULT_PRO_DAILY_LIMIT,
        }
    }
}

impl PlanLimits {
    pub fn daily_limit(&self, plan: Plan) -> i32 {
        match plan {
            Plan::Free => self.free,
            Plan::Trial => self.trial,
            Plan::Pro => self.pro,
        }
    }
}

/// A package that can be bought through a payment gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PurchasablePlan {
    Trial,
    Pro,
}

impl PurchasablePlan {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "trial" => Some(PurchasablePlan::Trial),
            "pro" => Some(PurchasablePlan::Pro),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PurchasablePlan::Trial => "trial",
            PurchasablePlan::Pro => "pro",
        }
    }

    /// Price in VND.
    pub fn amount_vnd(self) -> i64 {
        match self {
            PurchasablePlan::Trial => 9_000,
            PurchasablePlan::Pro => 49_000,
        }
    }

    /// How long the purchased plan stays active.
    pub fn duration_days(self) -> i64 {
        match self {
            PurchasablePlan::Trial => 3,
            PurchasablePlan::Pro => 30,
        }
    }

    /// Order description shown on the gateway's checkout page.
    pub fn description(self) -> &'static str {
        match self {
            PurchasablePlan::Trial => "AI Tóm tắt - Gói dùng thử 3 ngày",
            PurchasablePlan::Pro => "AI Tóm tắt - Gói Pro 1 tháng",
        }
    }

    /// The subscription tier granted on successful payment.
    pub fn grants(self) -> Plan {
        match self {
            PurchasablePlan::Trial => Plan::Trial,
            PurchasablePlan::Pro => Plan::Pro,
        }
    }
}

/// Payment gateway used for a purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentProvider {
    Momo,
    ZaloPay,
}

impl PaymentProvider {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "momo" => Some(PaymentProvider::Momo),
            "zalopay" => Some(PaymentProvider::ZaloPay),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PaymentProvider::Momo => "momo",
            PaymentProvider::ZaloPay => "zalopay",
        }
    }
}

/// Compute a new subscription expiry after a purchase.
///
/// Extends from the current expiry when it is still in the future, so buying
/// twice stacks the durations instead of discarding the remaining time.
pub fn new_expiry(current: Option<Timestamp>, now: Timestamp, days: i64) -> Timestamp {
    let base = match current {
        Some(expiry) if expiry > now => expiry,
        _ => now,
    };
    base + Duration::days(days)
}

/// Whether a stored subscription is still in force at `now`.
///
/// `Free` is always active. Paid plans need an expiry in the future.
pub fn is_subscription_active(plan: Plan, expiry: Option<Timestamp>, now: Timestamp) -> bool {
    if !plan.is_paid() {
        return true;
    }
    matches!(expiry, Some(e) if e > now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn at(day: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2026, 3, day, 12, 0, 0).unwrap()
    }

    #[test]
    fn plan_round_trips_through_db_names() {
        for plan in [Plan::Free, Plan::Trial, Plan::Pro] {
            assert_eq!(Plan::parse(plan.as_str()), plan);
        }
        assert_eq!(Plan::parse("premium"), Plan::Free);
    }

    #[test]
    fn default_limits_match_plan_tiers() {
        let limits = PlanLimits::default();
        assert_eq!(limits.daily_limit(Plan::Free), 5);
        assert_eq!(limits.daily_limit(Plan::Trial), 15);
        assert_eq!(limits.daily_limit(Plan::Pro), 100);
    }

    #[test]
    fn purchasable_plans_have_fixed_prices() {
        assert_eq!(PurchasablePlan::Trial.amount_vnd(), 9_000);
        assert_eq!(PurchasablePlan::Pro.amount_vnd(), 49_000);
        assert_eq!(PurchasablePlan::parse("pro"), Some(PurchasablePlan::Pro));
        assert_eq!(PurchasablePlan::parse("Pro"), None);
        assert_eq!(PurchasablePlan::Trial.grants(), Plan::Trial);
    }

    #[test]
    fn payment_providers_parse_lowercase_names() {
        assert_eq!(PaymentProvider::parse("momo"), Some(PaymentProvider::Momo));
        assert_eq!(PaymentProvider::parse("zalopay"), Some(PaymentProvider::ZaloPay));
        assert_eq!(PaymentProvider::parse("vnpay"), None);
        assert_eq!(PaymentProvider::ZaloPay.as_str(), "zalopay");
    }

    #[test]
    fn expiry_starts_from_now_when_lapsed() {
        let expiry = new_expiry(Some(at(1)), at(10), 30);
        assert_eq!(expiry, at(10) + Duration::days(30));
    }

    #[test]
    fn expiry_stacks_on_active_subscription() {
        let expiry = new_expiry(Some(at(20)), at(10), 3);
        assert_eq!(expiry, at(23));
    }

    #[test]
    fn free_plan_is_always_active() {
        assert!(is_subscription_active(Plan::Free, None, at(5)));
    }

    #[test]
    fn paid_plan_without_future_expiry_is_inactive() {
        assert!(!is_subscription_active(Plan::Pro, None, at(5)));
        assert!(!is_subscription_active(Plan::Pro, Some(at(4)), at(5)));
        assert!(is_subscription_active(Plan::Trial, Some(at(6)), at(5)));
    }
}
