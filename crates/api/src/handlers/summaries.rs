//! History and share-link handlers for the caller's saved results.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tomtat_core::error::CoreError;
use tomtat_core::sharing::{generate_share_id, is_share_expired, share_expiry};
use tomtat_core::types::{DbId, Timestamp};
use tomtat_db::models::status::SummaryKind;
use tomtat_db::models::summary::{CreateSummary, SaveSummaryRequest, Summary};
use tomtat_db::repositories::SummaryRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::usage;

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub summaries: Vec<Summary>,
}

#[derive(Debug, Serialize)]
pub struct SavedResponse {
    pub summary: Summary,
}

/// GET /api/summaries/history
///
/// The caller's 50 most recent records, newest first.
pub async fn list_history(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<HistoryResponse>> {
    let user = usage::load_user(&state, &auth).await?;
    let summaries = SummaryRepo::list_for_user(&state.pool, user.id).await?;
    Ok(Json(HistoryResponse { summaries }))
}

/// POST /api/summaries/history
///
/// Save a result the client already has (for example one produced before
/// signing in).
pub async fn save_history(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<SaveSummaryRequest>,
) -> AppResult<Json<SavedResponse>> {
    let (Some(original_text), Some(result)) = (
        input.original_text.filter(|t| !t.trim().is_empty()),
        input.summary.filter(|t| !t.trim().is_empty()),
    ) else {
        return Err(CoreError::Validation("Thiếu nội dung gốc hoặc bản tóm tắt".into()).into());
    };

    let user = usage::load_user(&state, &auth).await?;
    let summary = SummaryRepo::create(
        &state.pool,
        &CreateSummary {
            user_id: user.id,
            kind: SummaryKind::Summary,
            original_text,
            result,
            summary_mode: input.summary_mode,
            source: input.source,
            source_url: input.source_url,
            source_filename: input.source_filename,
        },
    )
    .await?;

    if let Err(e) = SummaryRepo::prune_for_user(&state.pool, user.id).await {
        tracing::warn!(user_id = user.id, error = %e, "Failed to prune history");
    }

    tracing::info!(user_id = user.id, summary_id = summary.id, "History record saved");
    Ok(Json(SavedResponse { summary }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRequest {
    pub summary_id: Option<DbId>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareResponse {
    pub success: bool,
    pub share_url: String,
    pub share_id: String,
    pub expires_at: Timestamp,
}

/// POST /api/summaries/share
///
/// Create a public link for one of the caller's records. A record that
/// already has a live link keeps it.
pub async fn create_share(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<ShareRequest>,
) -> AppResult<Json<ShareResponse>> {
    let summary_id = input
        .summary_id
        .ok_or_else(|| AppError::BadRequest("Thiếu mã bản tóm tắt".into()))?;

    let user = usage::load_user(&state, &auth).await?;
    let not_found = || {
        AppError::Core(CoreError::NotFound {
            entity: "bản tóm tắt",
            id: summary_id.to_string(),
        })
    };

    let existing = SummaryRepo::find_for_user(&state.pool, summary_id, user.id)
        .await?
        .ok_or_else(not_found)?;

    let now = Utc::now();
    let (share_id, expires_at) = match (existing.share_id, existing.share_expires_at) {
        (Some(id), Some(expires_at)) if !is_share_expired(Some(expires_at), now) => {
            (id, expires_at)
        }
        _ => {
            let share_id = generate_share_id();
            let expires_at = share_expiry(now);
            SummaryRepo::set_share(&state.pool, summary_id, user.id, &share_id, expires_at)
                .await?
                .ok_or_else(not_found)?;
            tracing::info!(user_id = user.id, summary_id, "Share link created");
            (share_id, expires_at)
        }
    };

    Ok(Json(ShareResponse {
        success: true,
        share_url: state.config.share_url(&share_id),
        share_id,
        expires_at,
    }))
}
