//! Route definitions for the anonymous tools.

use axum::routing::post;
use axum::Router;

use crate::handlers::guest;
use crate::state::AppState;

/// Guest routes mounted at `/guest`.
///
/// ```text
/// POST /summary          -> summary
/// POST /translate        -> translate
/// POST /simplify         -> simplify
/// POST /title-generator  -> title_generator
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/summary", post(guest::summary))
        .route("/translate", post(guest::translate))
        .route("/simplify", post(guest::simplify))
        .route("/title-generator", post(guest::title_generator))
}
