//! Route definitions for the caller's profile, usage and rewards.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{referrals, rewards, user};
use crate::state::AppState;

/// User routes mounted at `/user`.
///
/// ```text
/// GET  /profile       -> get_profile
/// PUT  /profile       -> update_profile
/// POST /sync          -> sync
/// GET  /usage         -> get_usage
/// GET  /subscription  -> get_subscription
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/profile",
            get(user::get_profile).put(user::update_profile),
        )
        .route("/sync", post(user::sync))
        .route("/usage", get(user::get_usage))
        .route("/subscription", get(user::get_subscription))
}

/// Reward routes merged at the `/api` root.
///
/// ```text
/// POST /daily-reward      -> claim_daily_reward
/// POST /referrals/redeem  -> redeem
/// ```
pub fn rewards_router() -> Router<AppState> {
    Router::new()
        .route("/daily-reward", post(rewards::claim_daily_reward))
        .route("/referrals/redeem", post(referrals::redeem))
}
