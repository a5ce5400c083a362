#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

use tomtat_api::auth::jwt::{AuthConfig, JwtKey};
use tomtat_api::captcha::CaptchaVerifier;
use tomtat_api::config::{CacheConfig, CaptchaConfig, LlmConfig, QuotaConfig, ServerConfig};
use tomtat_api::fetch::UrlFetcher;
use tomtat_api::router::build_app_router;
use tomtat_api::state::AppState;
use tomtat_cache::{CacheError, SummaryCache};
use tomtat_core::prompts::PromptSpec;
use tomtat_llm::{ChatCompletion, LlmError};
use tomtat_payments::{MomoClient, MomoConfig, ZaloPayClient, ZaloPayConfig};

pub const JWT_SECRET: &str = "test-jwt-secret";
pub const MOMO_ACCESS_KEY: &str = "MOMO_ACCESS";
pub const MOMO_SECRET_KEY: &str = "MOMO_SECRET";
pub const ZALOPAY_KEY2: &str = "ZALOPAY_KEY2";
pub const APP_URL: &str = "http://localhost:3000";

/// Build a test `ServerConfig`.
///
/// Gateways point at an unroutable port; tests that create payments
/// override the endpoint with a fake gateway.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec![APP_URL.to_string()],
        request_timeout_secs: 30,
        app_url: APP_URL.to_string(),
        auth: AuthConfig {
            key: JwtKey::Secret(JWT_SECRET.to_string()),
            issuer: None,
        },
        quota: QuotaConfig::default(),
        llm: LlmConfig::default(),
        cache: CacheConfig::default(),
        momo: MomoConfig {
            partner_code: "MOMOTEST".to_string(),
            access_key: MOMO_ACCESS_KEY.to_string(),
            secret_key: MOMO_SECRET_KEY.to_string(),
            endpoint: "http://127.0.0.1:9/create".to_string(),
        },
        zalopay: ZaloPayConfig {
            app_id: "2553".to_string(),
            key1: "ZALOPAY_KEY1".to_string(),
            key2: ZALOPAY_KEY2.to_string(),
            endpoint: "http://127.0.0.1:9/create".to_string(),
        },
        captcha: CaptchaConfig::default(),
    }
}

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

/// Completion backend that answers every prompt with a fixed reply.
pub struct FakeLlm {
    reply: String,
    prompts: Mutex<Vec<PromptSpec>>,
}

impl FakeLlm {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<PromptSpec> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatCompletion for FakeLlm {
    async fn complete(&self, prompt: &PromptSpec) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.clone());
        Ok(self.reply.clone())
    }
}

/// In-process cache.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCache {
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

#[async_trait]
impl SummaryCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Captcha verifier with a fixed verdict.
pub struct StubCaptcha(pub bool);

#[async_trait]
impl CaptchaVerifier for StubCaptcha {
    async fn verify(&self, _token: &str) -> bool {
        self.0
    }
}

/// Upstream fakes shared between a test and the app under test.
pub struct TestServices {
    pub llm: Arc<FakeLlm>,
    pub cache: Arc<MemoryCache>,
    pub captcha_ok: bool,
}

impl Default for TestServices {
    fn default() -> Self {
        Self {
            llm: Arc::new(FakeLlm::new("Bản tóm tắt thử nghiệm.")),
            cache: Arc::new(MemoryCache::default()),
            captcha_ok: true,
        }
    }
}

// ---------------------------------------------------------------------------
// App builders
// ---------------------------------------------------------------------------

/// Build the full application router with default fakes.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, test_config(), &TestServices::default())
}

/// Build the full application router through the production
/// [`build_app_router`], so the middleware stack is the same one `main.rs`
/// serves.
pub fn build_test_app_with(pool: PgPool, config: ServerConfig, services: &TestServices) -> Router {
    let state = test_state(pool, config.clone(), services);
    build_app_router(state, &config)
}

/// Application state wired to the given fakes, for tests that call
/// handler helpers directly.
pub fn test_state(pool: PgPool, config: ServerConfig, services: &TestServices) -> AppState {
    AppState {
        pool,
        momo: Arc::new(MomoClient::new(config.momo.clone())),
        zalopay: Arc::new(ZaloPayClient::new(config.zalopay.clone())),
        config: Arc::new(config),
        llm: services.llm.clone(),
        cache: services.cache.clone(),
        captcha: Arc::new(StubCaptcha(services.captcha_ok)),
        fetcher: UrlFetcher::new(),
    }
}

/// Mint an HS256 access token for `sub` valid for one hour.
pub fn token(sub: &str) -> String {
    let claims = serde_json::json!({
        "sub": sub,
        "email": format!("{sub}@example.com"),
        "exp": chrono::Utc::now().timestamp() + 3600,
    });
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: Router, method: Method, uri: &str, token: Option<&str>, body: Option<&Value>) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    send(app, Method::POST, uri, None, Some(&body)).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response {
    send(app, Method::POST, uri, Some(token), Some(&body)).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response {
    send(app, Method::PUT, uri, Some(token), Some(&body)).await
}

/// POST a raw body with an explicit content type.
pub async fn post_raw(app: Router, uri: &str, content_type: &str, body: String) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("Content-Type", content_type)
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}
