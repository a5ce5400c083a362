use std::sync::Arc;

use tomtat_cache::SummaryCache;
use tomtat_llm::ChatCompletion;
use tomtat_payments::{MomoClient, ZaloPayClient};

use crate::captcha::CaptchaVerifier;
use crate::config::ServerConfig;
use crate::fetch::UrlFetcher;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
/// Upstream services sit behind traits so tests can swap in fakes.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: tomtat_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Chat-completion backend.
    pub llm: Arc<dyn ChatCompletion>,
    /// Result cache (Redis or disabled).
    pub cache: Arc<dyn SummaryCache>,
    /// Guest captcha verification.
    pub captcha: Arc<dyn CaptchaVerifier>,
    /// Article download for URL summaries.
    pub fetcher: UrlFetcher,
    pub momo: Arc<MomoClient>,
    pub zalopay: Arc<ZaloPayClient>,
}
