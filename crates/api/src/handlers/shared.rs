use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use tomtat_core::error::CoreError;
use tomtat_core::sharing::is_share_expired;
use tomtat_db::models::summary::PublicSummary;
use tomtat_db::repositories::SummaryRepo;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SharedResponse {
    pub summary: PublicSummary,
}

/// GET /api/shared/{share_id}
///
/// Public view of a shared record: 404 for unknown ids, 410 once expired.
pub async fn get_shared(
    State(state): State<AppState>,
    Path(share_id): Path<String>,
) -> AppResult<Json<SharedResponse>> {
    let summary = SummaryRepo::find_by_share_id(&state.pool, &share_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "liên kết chia sẻ",
                id: share_id.clone(),
            })
        })?;

    if is_share_expired(summary.share_expires_at, Utc::now()) {
        return Err(CoreError::Gone("Liên kết chia sẻ đã hết hạn".into()).into());
    }

    Ok(Json(SharedResponse {
        summary: summary.into(),
    }))
}
