use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tomtat_core::error::CoreError;
use tomtat_core::quota::REFERRAL_REWARD_BONUS;
use tomtat_db::repositories::{ReferralRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::usage;

#[derive(Debug, Deserialize)]
pub struct RedeemRequest {
    pub code: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemResponse {
    pub success: bool,
    pub message: String,
    pub bonus_awarded: i32,
}

/// POST /api/referrals/redeem
///
/// The caller redeems someone's referral code; the code's owner receives
/// bonus uses for today. Each user can redeem at most one code, never
/// their own.
pub async fn redeem(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<RedeemRequest>,
) -> AppResult<Json<RedeemResponse>> {
    let code = input
        .code
        .map(|c| c.trim().to_ascii_uppercase())
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::BadRequest("Vui lòng nhập mã giới thiệu".into()))?;

    let referee = usage::load_user(&state, &auth).await?;

    let referrer = UserRepo::find_by_referral_code(&state.pool, &code)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "mã giới thiệu",
                id: code.clone(),
            })
        })?;

    if referrer.id == referee.id {
        return Err(CoreError::Validation("Không thể dùng mã giới thiệu của chính bạn".into()).into());
    }

    let today = Utc::now().date_naive();
    let referral = ReferralRepo::create_completed(
        &state.pool,
        referrer.id,
        referee.id,
        &code,
        REFERRAL_REWARD_BONUS,
        today,
    )
    .await?
    .ok_or_else(|| {
        AppError::Core(CoreError::Conflict("Bạn đã sử dụng mã giới thiệu trước đó".into()))
    })?;

    tracing::info!(
        referral_id = referral.id,
        referrer_id = referrer.id,
        referee_id = referee.id,
        "Referral redeemed"
    );

    Ok(Json(RedeemResponse {
        success: true,
        message: "Đã áp dụng mã giới thiệu thành công".to_string(),
        bonus_awarded: REFERRAL_REWARD_BONUS,
    }))
}
