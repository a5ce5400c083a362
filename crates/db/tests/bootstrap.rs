use sqlx::PgPool;

/// Connect, migrate, verify every table exists.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_full_bootstrap(pool: PgPool) {
    tomtat_db::health_check(&pool).await.unwrap();

    let tables = [
        "users",
        "summaries",
        "usage_logs",
        "referrals",
        "payment_transactions",
    ];

    for table in tables {
        let count: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&pool)
            .await
            .unwrap_or_else(|e| panic!("{table} query failed: {e}"));
        assert_eq!(count.0, 0, "{table} should start empty");
    }
}

/// The plan CHECK constraint only admits the three known tiers.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_subscription_check_constraint(pool: PgPool) {
    let result = sqlx::query(
        "INSERT INTO users (external_id, referral_code, subscription) VALUES ('u', 'CODE0001', 'Gold')",
    )
    .execute(&pool)
    .await;
    assert!(result.is_err());
}
