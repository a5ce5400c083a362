//! Integration tests for referral code redemption.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, post_json_auth, token};
use serde_json::json;
use sqlx::PgPool;

async fn referral_code_of(app: axum::Router, jwt: &str) -> String {
    let json = body_json(get_auth(app, "/api/user/profile", jwt).await).await;
    json["user"]["referralCode"].as_str().unwrap().to_string()
}

// ---------------------------------------------------------------------------
// Test: A redemption credits the referrer
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn redeeming_credits_the_referrer(pool: PgPool) {
    let app = common::build_test_app(pool);
    let referrer = token("referrer");
    let code = referral_code_of(app.clone(), &referrer).await;

    let response = post_json_auth(
        app.clone(),
        "/api/referrals/redeem",
        json!({ "code": code.to_lowercase() }),
        &token("referee"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["bonusAwarded"], 5);

    let profile = body_json(get_auth(app.clone(), "/api/user/profile", &referrer).await).await;
    assert_eq!(profile["user"]["referralsCount"], 1);
    assert_eq!(profile["user"]["bonusUses"], 5);

    let usage = body_json(get_auth(app, "/api/user/usage", &referrer).await).await;
    assert_eq!(usage["usageInfo"]["remainingUses"], 10);
}

// ---------------------------------------------------------------------------
// Test: Redemption rules
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn a_user_redeems_at_most_one_code(pool: PgPool) {
    let app = common::build_test_app(pool);
    let first_code = referral_code_of(app.clone(), &token("ref_one")).await;
    let second_code = referral_code_of(app.clone(), &token("ref_two")).await;
    let referee = token("greedy");

    let first = post_json_auth(
        app.clone(),
        "/api/referrals/redeem",
        json!({ "code": first_code }),
        &referee,
    )
    .await;
    assert_eq!(first.status(), StatusCode::OK);

    let second = post_json_auth(
        app,
        "/api/referrals/redeem",
        json!({ "code": second_code }),
        &referee,
    )
    .await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn own_code_cannot_be_redeemed(pool: PgPool) {
    let app = common::build_test_app(pool);
    let jwt = token("self_ref");
    let code = referral_code_of(app.clone(), &jwt).await;

    let response = post_json_auth(app, "/api/referrals/redeem", json!({ "code": code }), &jwt).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_code_is_not_found(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app,
        "/api/referrals/redeem",
        json!({ "code": "ZZZZ9999" }),
        &token("lost"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn blank_code_is_a_bad_request(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json_auth(app, "/api/referrals/redeem", json!({ "code": "  " }), &token("b")).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
