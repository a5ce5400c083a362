//! Integration tests for the summarizer and the metered text tools.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{body_json, post_json, post_json_auth, token, FakeLlm, TestServices};
use serde_json::json;
use sqlx::PgPool;
use tomtat_db::repositories::{SummaryRepo, UsageLogRepo, UserRepo};

const ARTICLE: &str = "Hà Nội là thủ đô của Việt Nam, nổi tiếng với Hồ Gươm, phố cổ \
                       và nền ẩm thực phong phú thu hút du khách quanh năm.";

/// Set today's usage count directly.
async fn set_used_today(pool: &PgPool, external_id: &str, count: i32) {
    sqlx::query(
        "UPDATE users SET daily_usage_count = $2, usage_reset_date = $3 WHERE external_id = $1",
    )
    .bind(external_id)
    .bind(count)
    .bind(chrono::Utc::now().date_naive())
    .execute(pool)
    .await
    .unwrap();
}

// ---------------------------------------------------------------------------
// Test: Signed-in summarize spends one use and records history
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn summarize_text_spends_a_use_and_saves_history(pool: PgPool) {
    let services = TestServices::default();
    let app = common::build_test_app_with(pool.clone(), common::test_config(), &services);
    let jwt = token("user_sum");

    let response = post_json_auth(
        app,
        "/api/summarize",
        json!({ "text": ARTICLE, "summaryMode": "detailed" }),
        &jwt,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["summary"], "Bản tóm tắt thử nghiệm.");
    assert_eq!(json["fromCache"], false);
    assert_eq!(json["remainingUses"], 4);
    assert_eq!(json["isGuest"], false);

    let user = UserRepo::find_by_external_id(&pool, "user_sum")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.daily_usage_count, 1);

    let history = SummaryRepo::list_for_user(&pool, user.id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].kind, "summary");
    assert_eq!(history[0].summary_mode.as_deref(), Some("detailed"));
    assert_eq!(history[0].source, "text");

    let logged = UsageLogRepo::count_for_day(&pool, user.id, chrono::Utc::now().date_naive())
        .await
        .unwrap();
    assert_eq!(logged, 1);
}

// ---------------------------------------------------------------------------
// Test: The second identical request is served from cache
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn repeated_summary_is_served_from_cache(pool: PgPool) {
    let services = TestServices::default();
    let app = common::build_test_app_with(pool, common::test_config(), &services);
    let jwt = token("user_cache");

    let first = post_json_auth(app.clone(), "/api/summarize", json!({ "text": ARTICLE }), &jwt).await;
    assert_eq!(first.status(), StatusCode::OK);

    // Whitespace differences normalize to the same key.
    let spaced = format!("  {ARTICLE}  ");
    let second = post_json_auth(app, "/api/summarize", json!({ "text": spaced }), &jwt).await;
    assert_eq!(second.status(), StatusCode::OK);

    let json = body_json(second).await;
    assert_eq!(json["fromCache"], true);
    // Cached answers still cost a use.
    assert_eq!(json["remainingUses"], 3);
    assert_eq!(services.llm.calls(), 1);
    assert_eq!(services.cache.len(), 1);
}

// ---------------------------------------------------------------------------
// Test: Summarize input validation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn summarize_requires_text_or_url(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json_auth(app, "/api/summarize", json!({ "text": "   " }), &token("u1")).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Cần cung cấp văn bản hoặc URL để tóm tắt");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn summarize_rejects_short_text_without_spending(pool: PgPool) {
    let services = TestServices::default();
    let app = common::build_test_app_with(pool.clone(), common::test_config(), &services);

    let response =
        post_json_auth(app, "/api/summarize", json!({ "text": "Quá ngắn." }), &token("u_short")).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    assert_eq!(services.llm.calls(), 0);

    let user = UserRepo::find_by_external_id(&pool, "u_short").await.unwrap().unwrap();
    assert_eq!(user.daily_usage_count, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn summarize_rejects_unfetchable_url(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app,
        "/api/summarize",
        json!({ "url": "ftp://example.com/bai-viet" }),
        &token("u_url"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Test: Guests must pass the captcha and are then asked to sign in
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn guest_summarize_without_captcha_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(app, "/api/summarize", json!({ "text": ARTICLE })).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn guest_summarize_with_failed_captcha_is_rejected(pool: PgPool) {
    let services = TestServices {
        captcha_ok: false,
        ..TestServices::default()
    };
    let app = common::build_test_app_with(pool, common::test_config(), &services);

    let response = post_json(
        app,
        "/api/summarize",
        json!({ "text": ARTICLE, "hcaptchaToken": "bad" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(services.llm.calls(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn guest_summarize_with_captcha_requires_login(pool: PgPool) {
    let services = TestServices::default();
    let app = common::build_test_app_with(pool, common::test_config(), &services);

    let response = post_json(
        app,
        "/api/summarize",
        json!({ "text": ARTICLE, "hcaptchaToken": "ok" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(services.llm.calls(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn guest_summarize_of_short_text_is_a_bad_request(pool: PgPool) {
    let services = TestServices::default();
    let app = common::build_test_app_with(pool, common::test_config(), &services);

    let response = post_json(
        app,
        "/api/summarize",
        json!({ "text": "Quá ngắn.", "hcaptchaToken": "ok" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(services.llm.calls(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn guest_mode_flag_forces_guest_path(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app,
        "/api/summarize",
        json!({ "text": ARTICLE, "guestMode": true }),
        &token("u_guest_mode"),
    )
    .await;

    // No captcha token supplied.
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_token_is_rejected_even_on_optional_auth(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json_auth(app, "/api/summarize", json!({ "text": ARTICLE }), "not-a-jwt").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Test: Quota exhaustion
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn exhausted_quota_returns_429_without_calling_llm(pool: PgPool) {
    let services = TestServices::default();
    let app = common::build_test_app_with(pool.clone(), common::test_config(), &services);
    let jwt = token("u_quota");

    // Create the user, then use up the Free allowance.
    let first = post_json_auth(app.clone(), "/api/keypoints", json!({ "text": ARTICLE }), &jwt).await;
    assert_eq!(first.status(), StatusCode::OK);
    set_used_today(&pool, "u_quota", 5).await;

    let response = post_json_auth(app, "/api/translate", json!({ "text": ARTICLE }), &jwt).await;

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let json = body_json(response).await;
    assert_eq!(json["code"], "QUOTA_EXCEEDED");
    assert_eq!(json["usage"]["remainingUses"], 0);
    assert_eq!(json["usage"]["dailyLimit"], 5);
    assert_eq!(services.llm.calls(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn bonus_uses_extend_the_allowance(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let jwt = token("u_bonus");

    let claim = post_json_auth(app.clone(), "/api/daily-reward", json!({}), &jwt).await;
    assert_eq!(claim.status(), StatusCode::OK);
    set_used_today(&pool, "u_bonus", 5).await;

    let response = post_json_auth(app, "/api/simplify", json!({ "text": ARTICLE }), &jwt).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["remainingUses"], 2);
}

// ---------------------------------------------------------------------------
// Test: Text tools
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn feature_endpoints_require_login(pool: PgPool) {
    let app = common::build_test_app(pool);

    for uri in ["/api/translate", "/api/simplify", "/api/keypoints", "/api/title-generator"] {
        let response = post_json(app.clone(), uri, json!({ "text": ARTICLE })).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn translate_defaults_to_english_to_vietnamese(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app,
        "/api/translate",
        json!({ "text": "Good morning, Hanoi." }),
        &token("u_tr"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["direction"], "en-vi");
    assert_eq!(json["originalText"], "Good morning, Hanoi.");
    assert_eq!(json["remainingUses"], 4);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn empty_text_is_rejected_before_quota(pool: PgPool) {
    let services = TestServices::default();
    let app = common::build_test_app_with(pool, common::test_config(), &services);

    let response = post_json_auth(app, "/api/simplify", json!({ "text": "" }), &token("u_empty")).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Vui lòng nhập văn bản");
    assert_eq!(services.llm.calls(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn simplify_reports_level(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app,
        "/api/simplify",
        json!({ "text": ARTICLE, "level": "basic" }),
        &token("u_simple"),
    )
    .await;

    let json = body_json(response).await;
    assert_eq!(json["level"], "basic");
    assert_eq!(json["isGuest"], false);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn title_generator_returns_clean_titles(pool: PgPool) {
    let services = TestServices {
        llm: Arc::new(FakeLlm::new("1. Hà Nội mùa thu\n2. Phố cổ về đêm\n- Hồ Gươm xanh\n4. Thừa")),
        ..TestServices::default()
    };
    let app = common::build_test_app_with(pool.clone(), common::test_config(), &services);

    let response = post_json_auth(
        app,
        "/api/title-generator",
        json!({ "text": ARTICLE, "count": 3 }),
        &token("u_title"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(
        json["titles"],
        json!(["Hà Nội mùa thu", "Phố cổ về đêm", "Hồ Gươm xanh"])
    );

    let user = UserRepo::find_by_external_id(&pool, "u_title").await.unwrap().unwrap();
    let history = SummaryRepo::list_for_user(&pool, user.id).await.unwrap();
    assert_eq!(history[0].kind, "title-generator");
    assert_eq!(history[0].result, "Hà Nội mùa thu\nPhố cổ về đêm\nHồ Gươm xanh");
}
