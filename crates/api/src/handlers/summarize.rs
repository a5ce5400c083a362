//! Handler for `POST /api/summarize`, the main summarizer.
//!
//! Signed-in callers are metered and their results cached and saved to
//! history. Guests must pass hCaptcha and the content checks and are then
//! told to sign in; the anonymous summarizer lives under `/api/guest/summary`.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tomtat_core::cache_key::cache_key;
use tomtat_core::error::CoreError;
use tomtat_core::prompts::{self, SummaryMode};
use tomtat_core::text::{char_len, truncate_chars, SUMMARY_MAX_CHARS, SUMMARY_MIN_CHARS};
use tomtat_db::models::status::SummaryKind;
use tomtat_db::models::summary::CreateSummary;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AuthUser, MaybeAuthUser};
use crate::state::AppState;
use crate::usage;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeRequest {
    pub text: Option<String>,
    pub url: Option<String>,
    pub summary_mode: Option<String>,
    pub hcaptcha_token: Option<String>,
    #[serde(default)]
    pub guest_mode: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeResponse {
    pub summary: String,
    pub from_cache: bool,
    pub remaining_uses: i32,
    pub is_guest: bool,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// POST /api/summarize
pub async fn summarize(
    State(state): State<AppState>,
    MaybeAuthUser(auth): MaybeAuthUser,
    Json(input): Json<SummarizeRequest>,
) -> AppResult<Json<SummarizeResponse>> {
    let text = non_blank(input.text);
    let url = non_blank(input.url);
    if text.is_none() && url.is_none() {
        return Err(AppError::BadRequest(
            "Cần cung cấp văn bản hoặc URL để tóm tắt".into(),
        ));
    }

    let auth = match auth {
        Some(auth) if !input.guest_mode => auth,
        _ => return reject_guest(&state, input.hcaptcha_token.as_deref(), text, url).await,
    };

    let mode = SummaryMode::parse_or_default(input.summary_mode.as_deref());
    summarize_for_user(&state, &auth, text, url, mode).await.map(Json)
}

/// Guests pass the captcha and content checks and are then asked to sign in.
async fn reject_guest(
    state: &AppState,
    token: Option<&str>,
    text: Option<String>,
    url: Option<String>,
) -> AppResult<Json<SummarizeResponse>> {
    let Some(token) = token.filter(|t| !t.is_empty()) else {
        return Err(AppError::BadRequest(
            "Vui lòng xác thực hCaptcha để tiếp tục".into(),
        ));
    };
    if !state.captcha.verify(token).await {
        return Err(AppError::BadRequest(
            "Xác thực hCaptcha không hợp lệ. Vui lòng thử lại.".into(),
        ));
    }
    load_content(state, text, url.as_deref()).await?;
    Err(CoreError::Unauthorized("Vui lòng đăng nhập để sử dụng tính năng này.".into()).into())
}

/// Resolve the text to summarize (fetching `url` when given), enforce the
/// minimum length and truncate to the maximum.
async fn load_content(
    state: &AppState,
    text: Option<String>,
    url: Option<&str>,
) -> AppResult<String> {
    let content = match url {
        Some(url) => state.fetcher.fetch_text(url).await.map_err(|e| {
            tracing::info!(url = %url, error = %e, "Failed to fetch URL content");
            AppError::BadRequest(
                "Không thể tải nội dung từ URL này. Vui lòng kiểm tra lại đường dẫn.".into(),
            )
        })?,
        None => text.unwrap_or_default(),
    };

    if char_len(content.trim()) < SUMMARY_MIN_CHARS {
        return Err(CoreError::Validation(format!(
            "Nội dung quá ngắn để tóm tắt (tối thiểu {SUMMARY_MIN_CHARS} ký tự)"
        ))
        .into());
    }
    Ok(truncate_chars(&content, SUMMARY_MAX_CHARS))
}

async fn summarize_for_user(
    state: &AppState,
    auth: &AuthUser,
    text: Option<String>,
    url: Option<String>,
    mode: SummaryMode,
) -> AppResult<SummarizeResponse> {
    let metered = usage::require_quota(state, auth).await?;
    let content = load_content(state, text, url.as_deref()).await?;

    let key = cache_key(mode.as_str(), &content);
    let (summary, from_cache) =
        usage::cached_completion(state, &key, &prompts::summarize(mode, &content)).await?;

    let remaining_uses = usage::consume(state, &metered, SummaryKind::Summary).await?;

    usage::save_history(
        state,
        CreateSummary {
            user_id: metered.user.id,
            kind: SummaryKind::Summary,
            original_text: content,
            result: summary.clone(),
            summary_mode: Some(mode.as_str().to_string()),
            source: Some(if url.is_some() { "url" } else { "text" }.to_string()),
            source_url: url,
            source_filename: None,
        },
    )
    .await;

    tracing::info!(user_id = metered.user.id, mode = mode.as_str(), from_cache, "Summary generated");

    Ok(SummarizeResponse {
        summary,
        from_cache,
        remaining_uses,
        is_guest: false,
    })
}
