//! Metered text tools for signed-in users: translate, simplify, key points
//! and title generation.
//!
//! Each handler validates input, checks the caller's quota, runs one LLM
//! call, spends one use and saves the result to history.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tomtat_core::prompts::{self, Direction, SimplifyLevel};
use tomtat_core::text::{clamp_title_count, parse_title_lines};
use tomtat_core::types::DbId;
use tomtat_db::models::status::SummaryKind;
use tomtat_db::models::summary::CreateSummary;

use crate::error::AppResult;
use crate::handlers::require_text;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::usage;

fn history(
    user_id: DbId,
    kind: SummaryKind,
    original_text: &str,
    result: &str,
    summary_mode: Option<&str>,
) -> CreateSummary {
    CreateSummary {
        user_id,
        kind,
        original_text: original_text.to_string(),
        result: result.to_string(),
        summary_mode: summary_mode.map(str::to_string),
        source: None,
        source_url: None,
        source_filename: None,
    }
}

// ---------------------------------------------------------------------------
// Translate
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    pub text: Option<String>,
    pub direction: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateResponse {
    pub success: bool,
    pub translated_text: String,
    pub direction: &'static str,
    pub original_text: String,
    pub remaining_uses: i32,
}

/// POST /api/translate
pub async fn translate(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<TranslateRequest>,
) -> AppResult<Json<TranslateResponse>> {
    let text = require_text(input.text)?;
    let direction = Direction::parse_or(input.direction.as_deref(), Direction::EnVi);

    let metered = usage::require_quota(&state, &auth).await?;
    let translated = state.llm.complete(&prompts::translate(direction, &text)).await?;
    let remaining_uses = usage::consume(&state, &metered, SummaryKind::Translate).await?;

    usage::save_history(
        &state,
        history(
            metered.user.id,
            SummaryKind::Translate,
            &text,
            &translated,
            Some(direction.code()),
        ),
    )
    .await;

    Ok(Json(TranslateResponse {
        success: true,
        translated_text: translated,
        direction: direction.code(),
        original_text: text,
        remaining_uses,
    }))
}

// ---------------------------------------------------------------------------
// Simplify
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SimplifyRequest {
    pub text: Option<String>,
    pub level: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplifyResponse {
    pub success: bool,
    pub simplified_text: String,
    pub level: &'static str,
    pub remaining_uses: i32,
    pub is_guest: bool,
}

/// POST /api/simplify
pub async fn simplify(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<SimplifyRequest>,
) -> AppResult<Json<SimplifyResponse>> {
    let text = require_text(input.text)?;
    let level = SimplifyLevel::parse_or_default(input.level.as_deref());

    let metered = usage::require_quota(&state, &auth).await?;
    let simplified = state.llm.complete(&prompts::simplify(level, &text)).await?;
    let remaining_uses = usage::consume(&state, &metered, SummaryKind::Simplify).await?;

    usage::save_history(
        &state,
        history(
            metered.user.id,
            SummaryKind::Simplify,
            &text,
            &simplified,
            Some(level.as_str()),
        ),
    )
    .await;

    Ok(Json(SimplifyResponse {
        success: true,
        simplified_text: simplified,
        level: level.as_str(),
        remaining_uses,
        is_guest: false,
    }))
}

// ---------------------------------------------------------------------------
// Key points
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct KeypointsRequest {
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeypointsResponse {
    pub success: bool,
    pub keypoints: String,
    pub remaining_uses: i32,
    pub is_guest: bool,
}

/// POST /api/keypoints
pub async fn keypoints(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<KeypointsRequest>,
) -> AppResult<Json<KeypointsResponse>> {
    let text = require_text(input.text)?;

    let metered = usage::require_quota(&state, &auth).await?;
    let keypoints = state.llm.complete(&prompts::keypoints(&text)).await?;
    let remaining_uses = usage::consume(&state, &metered, SummaryKind::Keypoints).await?;

    usage::save_history(
        &state,
        history(metered.user.id, SummaryKind::Keypoints, &text, &keypoints, None),
    )
    .await;

    Ok(Json(KeypointsResponse {
        success: true,
        keypoints,
        remaining_uses,
        is_guest: false,
    }))
}

// ---------------------------------------------------------------------------
// Title generator
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct TitleRequest {
    pub text: Option<String>,
    pub count: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleResponse {
    pub success: bool,
    pub titles: Vec<String>,
    pub remaining_uses: i32,
    pub is_guest: bool,
}

/// POST /api/title-generator
pub async fn title_generator(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<TitleRequest>,
) -> AppResult<Json<TitleResponse>> {
    let text = require_text(input.text)?;
    let count = clamp_title_count(input.count);

    let metered = usage::require_quota(&state, &auth).await?;
    let reply = state
        .llm
        .complete(&prompts::title_generator(count, &text))
        .await?;
    let titles = parse_title_lines(&reply, count);
    let remaining_uses = usage::consume(&state, &metered, SummaryKind::TitleGenerator).await?;

    usage::save_history(
        &state,
        history(
            metered.user.id,
            SummaryKind::TitleGenerator,
            &text,
            &titles.join("\n"),
            None,
        ),
    )
    .await;

    Ok(Json(TitleResponse {
        success: true,
        titles,
        remaining_uses,
        is_guest: false,
    }))
}
