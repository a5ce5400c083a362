//! Repository for the `payment_transactions` table.

use sqlx::PgPool;
use tomtat_core::plans::{new_expiry, PaymentProvider};
use tomtat_core::types::{DbId, Timestamp};

use crate::models::payment::{CreatePaymentTransaction, PaymentTransaction};
use crate::models::status::PaymentStatus;
use crate::models::user::User;
use crate::repositories::user_repo::{self, UserRepo};

const COLUMNS: &str = "id, transaction_id, user_id, payment_provider, plan_type, amount, \
    currency, status, provider_order_id, provider_trans_id, provider_response, expires_at, \
    completed_at, created_at, updated_at";

/// Provides storage for gateway payments and the completion flow.
pub struct PaymentRepo;

impl PaymentRepo {
    /// Record a pending transaction.
    pub async fn create(
        pool: &PgPool,
        input: &CreatePaymentTransaction,
    ) -> Result<PaymentTransaction, sqlx::Error> {
        let query = format!(
            "INSERT INTO payment_transactions
                (transaction_id, user_id, payment_provider, plan_type, amount, status,
                 provider_order_id, provider_response, expires_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PaymentTransaction>(&query)
            .bind(&input.transaction_id)
            .bind(input.user_id)
            .bind(input.provider.as_str())
            .bind(input.plan.as_str())
            .bind(input.amount)
            .bind(PaymentStatus::Pending.as_str())
            .bind(&input.provider_order_id)
            .bind(&input.provider_response)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_transaction_id(
        pool: &PgPool,
        transaction_id: &str,
    ) -> Result<Option<PaymentTransaction>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM payment_transactions WHERE transaction_id = $1");
        sqlx::query_as::<_, PaymentTransaction>(&query)
            .bind(transaction_id)
            .fetch_optional(pool)
            .await
    }

    /// Find the transaction a gateway callback refers to.
    ///
    /// Order ids are only unique per gateway, so the provider is part of the
    /// lookup.
    pub async fn find_by_provider_order_id(
        pool: &PgPool,
        provider: PaymentProvider,
        provider_order_id: &str,
    ) -> Result<Option<PaymentTransaction>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM payment_transactions
             WHERE payment_provider = $1 AND provider_order_id = $2"
        );
        sqlx::query_as::<_, PaymentTransaction>(&query)
            .bind(provider.as_str())
            .bind(provider_order_id)
            .fetch_optional(pool)
            .await
    }

    /// Complete a pending transaction and grant its plan to the buyer.
    ///
    /// Runs in one database transaction. The new expiry stacks on any still
    /// active subscription. Returns `None` if the transaction was not pending
    /// (already completed or failed), in which case nothing is changed.
    pub async fn mark_completed(
        pool: &PgPool,
        id: DbId,
        provider_trans_id: Option<&str>,
        provider_response: Option<&serde_json::Value>,
        now: Timestamp,
    ) -> Result<Option<(PaymentTransaction, User)>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE payment_transactions SET
                status = $2,
                provider_trans_id = COALESCE($3, provider_trans_id),
                provider_response = COALESCE($4, provider_response),
                completed_at = $5,
                updated_at = NOW()
             WHERE id = $1 AND status = $6
             RETURNING {COLUMNS}"
        );
        let Some(payment) = sqlx::query_as::<_, PaymentTransaction>(&query)
            .bind(id)
            .bind(PaymentStatus::Completed.as_str())
            .bind(provider_trans_id)
            .bind(provider_response)
            .bind(now)
            .bind(PaymentStatus::Pending.as_str())
            .fetch_optional(&mut *tx)
            .await?
        else {
            tx.rollback().await?;
            return Ok(None);
        };

        let Some(plan) = payment.plan() else {
            tx.rollback().await?;
            return Err(sqlx::Error::Decode(
                format!("unknown plan_type {:?}", payment.plan_type).into(),
            ));
        };

        // Lock the buyer row so concurrent purchases stack correctly.
        let query = format!(
            "SELECT {} FROM users WHERE id = $1 FOR UPDATE",
            user_repo::COLUMNS
        );
        let buyer = sqlx::query_as::<_, User>(&query)
            .bind(payment.user_id)
            .fetch_one(&mut *tx)
            .await?;

        let current_expiry = if buyer.plan().is_paid() {
            buyer.subscription_expiry
        } else {
            None
        };
        let expiry = new_expiry(current_expiry, now, plan.duration_days());
        let user = UserRepo::apply_subscription(&mut *tx, buyer.id, plan.grants(), expiry).await?;

        tx.commit().await?;
        Ok(Some((payment, user)))
    }

    /// Mark a pending transaction as failed. Returns `true` if a row changed.
    pub async fn mark_failed(
        pool: &PgPool,
        id: DbId,
        provider_response: Option<&serde_json::Value>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE payment_transactions SET
                status = $2,
                provider_response = COALESCE($3, provider_response),
                updated_at = NOW()
             WHERE id = $1 AND status = $4",
        )
        .bind(id)
        .bind(PaymentStatus::Failed.as_str())
        .bind(provider_response)
        .bind(PaymentStatus::Pending.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
