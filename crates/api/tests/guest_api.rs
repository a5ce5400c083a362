//! Integration tests for the anonymous tools under `/api/guest`.

mod common;

use axum::http::StatusCode;
use common::{body_json, post_json, TestServices};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Test: Guest summary is cached under its own namespace
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn guest_summary_is_cached(pool: PgPool) {
    let services = TestServices::default();
    let app = common::build_test_app_with(pool, common::test_config(), &services);
    let body = json!({ "text": "Giá xăng trong nước giảm lần thứ ba liên tiếp.", "summaryMode": "bullet" });

    let first = post_json(app.clone(), "/api/guest/summary", body.clone()).await;
    assert_eq!(first.status(), StatusCode::OK);
    let json = body_json(first).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["mode"], "bullet");
    assert_eq!(json["summary"], "Bản tóm tắt thử nghiệm.");

    let second = post_json(app, "/api/guest/summary", body).await;
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(services.llm.calls(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn guest_summary_unknown_mode_falls_back_to_brief(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(
        app,
        "/api/guest/summary",
        json!({ "text": "Một đoạn văn ngắn.", "summaryMode": "poem" }),
    )
    .await;

    assert_eq!(body_json(response).await["mode"], "brief");
}

// ---------------------------------------------------------------------------
// Test: Length limits
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn guest_summary_rejects_text_over_limit(pool: PgPool) {
    let services = TestServices::default();
    let app = common::build_test_app_with(pool, common::test_config(), &services);

    let response = post_json(app, "/api/guest/summary", json!({ "text": "ă".repeat(5001) })).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(services.llm.calls(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn guest_tools_limit_input_to_3000_chars(pool: PgPool) {
    let app = common::build_test_app(pool);
    let long = "ơ".repeat(3001);

    for uri in ["/api/guest/translate", "/api/guest/simplify", "/api/guest/title-generator"] {
        let response = post_json(app.clone(), uri, json!({ "text": long })).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
    }

    let at_limit = post_json(app, "/api/guest/translate", json!({ "text": "ơ".repeat(3000) })).await;
    assert_eq!(at_limit.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn guest_tools_require_text(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(app, "/api/guest/simplify", json!({})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Test: Defaults
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn guest_translate_defaults_to_vietnamese_to_english(pool: PgPool) {
    let services = TestServices::default();
    let app = common::build_test_app_with(pool, common::test_config(), &services);

    let response = post_json(app, "/api/guest/translate", json!({ "text": "Xin chào" })).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["direction"], "vi-en");
    assert_eq!(json["translatedText"], "Bản tóm tắt thử nghiệm.");
    assert!(services.llm.prompts()[0].user.contains("Xin chào"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn guest_simplify_defaults_to_medium(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(app, "/api/guest/simplify", json!({ "text": "Văn bản phức tạp." })).await;

    let json = body_json(response).await;
    assert_eq!(json["level"], "medium");
    assert!(json.get("remainingUses").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn guest_titles_are_returned_as_list(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(
        app,
        "/api/guest/title-generator",
        json!({ "text": "Bài viết về du lịch Đà Lạt.", "count": 1 }),
    )
    .await;

    let json = body_json(response).await;
    assert_eq!(json["titles"], json!(["Bản tóm tắt thử nghiệm."]));
}
