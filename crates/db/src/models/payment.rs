//! Payment transaction model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use tomtat_core::plans::{PaymentProvider, PurchasablePlan};
use tomtat_core::types::{DbId, Timestamp};

use crate::models::status::PaymentStatus;

/// A row from the `payment_transactions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentTransaction {
    pub id: DbId,
    pub transaction_id: String,
    pub user_id: DbId,
    pub payment_provider: String,
    pub plan_type: String,
    pub amount: i64,
    pub currency: String,
    pub status: String,
    pub provider_order_id: String,
    pub provider_trans_id: Option<String>,
    pub provider_response: Option<serde_json::Value>,
    pub expires_at: Timestamp,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PaymentTransaction {
    pub fn status(&self) -> Option<PaymentStatus> {
        PaymentStatus::parse(&self.status)
    }

    pub fn plan(&self) -> Option<PurchasablePlan> {
        PurchasablePlan::parse(&self.plan_type)
    }

    pub fn provider(&self) -> Option<PaymentProvider> {
        PaymentProvider::parse(&self.payment_provider)
    }

    /// Status shown to the buyer: a pending transaction past `expires_at`
    /// reads as `expired`. The stored status is not changed, so a late but
    /// verified gateway callback can still complete it.
    pub fn reported_status(&self, now: Timestamp) -> &str {
        if self.status() == Some(PaymentStatus::Pending) && self.expires_at <= now {
            "expired"
        } else {
            &self.status
        }
    }
}

/// DTO for recording a freshly created gateway order.
#[derive(Debug, Clone)]
pub struct CreatePaymentTransaction {
    pub transaction_id: String,
    pub user_id: DbId,
    pub provider: PaymentProvider,
    pub plan: PurchasablePlan,
    pub amount: i64,
    pub provider_order_id: String,
    pub provider_response: Option<serde_json::Value>,
    pub expires_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn transaction(status: PaymentStatus, expires_at: Timestamp) -> PaymentTransaction {
        PaymentTransaction {
            id: 1,
            transaction_id: "TXN1".into(),
            user_id: 1,
            payment_provider: "momo".into(),
            plan_type: "pro".into(),
            amount: 49_000,
            currency: "VND".into(),
            status: status.as_str().into(),
            provider_order_id: "VSUM_1_abcdefg".into(),
            provider_trans_id: None,
            provider_response: None,
            expires_at,
            completed_at: None,
            created_at: expires_at - Duration::minutes(15),
            updated_at: expires_at - Duration::minutes(15),
        }
    }

    #[test]
    fn pending_past_expiry_reads_as_expired() {
        let deadline = Utc.with_ymd_and_hms(2026, 5, 14, 8, 15, 0).unwrap();
        let pending = transaction(PaymentStatus::Pending, deadline);

        assert_eq!(pending.reported_status(deadline - Duration::minutes(1)), "pending");
        assert_eq!(pending.reported_status(deadline), "expired");
    }

    #[test]
    fn settled_transactions_keep_their_status() {
        let deadline = Utc.with_ymd_and_hms(2026, 5, 14, 8, 15, 0).unwrap();
        let later = deadline + Duration::hours(1);

        assert_eq!(transaction(PaymentStatus::Completed, deadline).reported_status(later), "completed");
        assert_eq!(transaction(PaymentStatus::Failed, deadline).reported_status(later), "failed");
    }
}
