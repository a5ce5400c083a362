pub mod features;
pub mod guest;
pub mod health;
pub mod payment;
pub mod summaries;
pub mod user;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /summarize                     summarize text or URL (optional auth)
/// /translate                     translate (auth)
/// /simplify                      simplify (auth)
/// /keypoints                     extract key points (auth)
/// /title-generator               suggest titles (auth)
///
/// /guest/summary                 guest summary (no auth)
/// /guest/translate               guest translate
/// /guest/simplify                guest simplify
/// /guest/title-generator         guest titles
///
/// /user/profile                  get, update (auth)
/// /user/sync                     sync identity from the login provider
/// /user/usage                    today's quota
/// /user/subscription             effective plan and expiry
///
/// /daily-reward                  claim today's bonus uses (auth)
/// /referrals/redeem              redeem a referral code (auth)
///
/// /summaries/history             list, save (auth)
/// /summaries/share               create share link (auth)
/// /shared/{share_id}             public shared summary (no auth)
///
/// /payment/create                create payment (POST), status (GET)
/// /payment/momo                  create MoMo payment
/// /payment/zalopay               create ZaloPay payment
/// /payment/callback              gateway callback (POST, GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Summarize and the signed-in text tools.
        .merge(features::router())
        // Anonymous tools.
        .nest("/guest", guest::router())
        // Profile, usage and subscription.
        .nest("/user", user::router())
        // Daily reward and referrals.
        .merge(user::rewards_router())
        // History and sharing.
        .nest("/summaries", summaries::router())
        .nest("/shared", summaries::shared_router())
        // Plan purchases.
        .nest("/payment", payment::router())
}
