use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use tomtat_db::repositories::UserRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::usage;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRewardResponse {
    pub success: bool,
    pub message: String,
    pub bonus_usages: i32,
}

/// POST /api/daily-reward
///
/// Grants the daily login bonus once per UTC day. A repeat claim is not an
/// error; it answers `success: false`.
pub async fn claim_daily_reward(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DailyRewardResponse>> {
    let user = usage::load_user(&state, &auth).await?;
    let bonus = state.config.quota.daily_reward_bonus;
    let today = Utc::now().date_naive();

    let response = match UserRepo::grant_daily_reward(&state.pool, user.id, bonus, today).await? {
        Some(_) => {
            tracing::info!(user_id = user.id, bonus, "Daily reward granted");
            DailyRewardResponse {
                success: true,
                message: format!(
                    "🎉 Chúc mừng! Bạn nhận được {bonus} lượt sử dụng miễn phí hôm nay!"
                ),
                bonus_usages: bonus,
            }
        }
        None => DailyRewardResponse {
            success: false,
            message: "Bạn đã nhận phần thưởng đăng nhập hôm nay rồi.".to_string(),
            bonus_usages: 0,
        },
    };
    Ok(Json(response))
}
