//! Anonymous variants of the text tools.
//!
//! No quota and no history; inputs are capped instead. Guest summaries are
//! cached like signed-in ones but under their own key namespace since they
//! use a different prompt.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tomtat_core::cache_key::cache_key;
use tomtat_core::prompts::{self, Direction, SimplifyLevel, SummaryMode};
use tomtat_core::text::{
    clamp_title_count, parse_title_lines, GUEST_SUMMARY_MAX_CHARS, GUEST_TEXT_MAX_CHARS,
};

use crate::error::AppResult;
use crate::handlers::require_guest_text;
use crate::state::AppState;
use crate::usage;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestSummaryRequest {
    pub text: Option<String>,
    pub summary_mode: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GuestSummaryResponse {
    pub success: bool,
    pub summary: String,
    pub mode: &'static str,
}

/// POST /api/guest/summary
pub async fn summary(
    State(state): State<AppState>,
    Json(input): Json<GuestSummaryRequest>,
) -> AppResult<Json<GuestSummaryResponse>> {
    let text = require_guest_text(input.text, GUEST_SUMMARY_MAX_CHARS)?;
    let mode = SummaryMode::parse_or_default(input.summary_mode.as_deref());

    let key = cache_key(&format!("guest-{}", mode.as_str()), &text);
    let (summary, from_cache) =
        usage::cached_completion(&state, &key, &prompts::guest_summary(mode, &text)).await?;
    tracing::debug!(mode = mode.as_str(), from_cache, "Guest summary generated");

    Ok(Json(GuestSummaryResponse {
        success: true,
        summary,
        mode: mode.as_str(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct GuestTranslateRequest {
    pub text: Option<String>,
    pub direction: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestTranslateResponse {
    pub success: bool,
    pub translated_text: String,
    pub direction: &'static str,
}

/// POST /api/guest/translate
pub async fn translate(
    State(state): State<AppState>,
    Json(input): Json<GuestTranslateRequest>,
) -> AppResult<Json<GuestTranslateResponse>> {
    let text = require_guest_text(input.text, GUEST_TEXT_MAX_CHARS)?;
    let direction = Direction::parse_or(input.direction.as_deref(), Direction::ViEn);

    let translated = state
        .llm
        .complete(&prompts::guest_translate(direction, &text))
        .await?;

    Ok(Json(GuestTranslateResponse {
        success: true,
        translated_text: translated,
        direction: direction.code(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct GuestSimplifyRequest {
    pub text: Option<String>,
    pub level: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestSimplifyResponse {
    pub success: bool,
    pub simplified_text: String,
    pub level: &'static str,
}

/// POST /api/guest/simplify
pub async fn simplify(
    State(state): State<AppState>,
    Json(input): Json<GuestSimplifyRequest>,
) -> AppResult<Json<GuestSimplifyResponse>> {
    let text = require_guest_text(input.text, GUEST_TEXT_MAX_CHARS)?;
    let level = SimplifyLevel::parse_or_default(input.level.as_deref());

    let simplified = state
        .llm
        .complete(&prompts::guest_simplify(level, &text))
        .await?;

    Ok(Json(GuestSimplifyResponse {
        success: true,
        simplified_text: simplified,
        level: level.as_str(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct GuestTitleRequest {
    pub text: Option<String>,
    pub count: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct GuestTitleResponse {
    pub success: bool,
    pub titles: Vec<String>,
}

/// POST /api/guest/title-generator
pub async fn title_generator(
    State(state): State<AppState>,
    Json(input): Json<GuestTitleRequest>,
) -> AppResult<Json<GuestTitleResponse>> {
    let text = require_guest_text(input.text, GUEST_TEXT_MAX_CHARS)?;
    let count = clamp_title_count(input.count);

    let reply = state
        .llm
        .complete(&prompts::guest_title_generator(count, &text))
        .await?;

    Ok(Json(GuestTitleResponse {
        success: true,
        titles: parse_title_lines(&reply, count),
    }))
}
