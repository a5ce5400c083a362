//! Route definitions for the signed-in text tools.

use axum::routing::post;
use axum::Router;

use crate::handlers::{features, summarize};
use crate::state::AppState;

/// Feature routes merged at the `/api` root.
///
/// ```text
/// POST /summarize        -> summarize (optional auth, guests need hCaptcha)
/// POST /translate        -> translate
/// POST /simplify         -> simplify
/// POST /keypoints        -> keypoints
/// POST /title-generator  -> title_generator
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/summarize", post(summarize::summarize))
        .route("/translate", post(features::translate))
        .route("/simplify", post(features::simplify))
        .route("/keypoints", post(features::keypoints))
        .route("/title-generator", post(features::title_generator))
}
