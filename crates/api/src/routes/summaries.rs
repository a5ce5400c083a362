//! Route definitions for summary history and public share links.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{shared, summaries};
use crate::state::AppState;

/// History routes mounted at `/summaries`.
///
/// ```text
/// GET  /history  -> list_history
/// POST /history  -> save_history
/// POST /share    -> create_share
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/history",
            get(summaries::list_history).post(summaries::save_history),
        )
        .route("/share", post(summaries::create_share))
}

/// Public share routes mounted at `/shared`.
///
/// ```text
/// GET /{share_id}  -> get_shared (no auth)
/// ```
pub fn shared_router() -> Router<AppState> {
    Router::new().route("/{share_id}", get(shared::get_shared))
}
