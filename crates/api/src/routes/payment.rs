//! Route definitions for plan purchases and gateway callbacks.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::payment;
use crate::state::AppState;

/// Payment routes mounted at `/payment`.
///
/// ```text
/// POST /create     -> create_payment
/// GET  /create     -> get_payment_status (?transactionId=)
/// POST /momo       -> create_momo_payment
/// POST /zalopay    -> create_zalopay_payment
/// POST /callback   -> payment_callback (signature-verified, no auth)
/// GET  /callback   -> payment_callback
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/create",
            post(payment::create_payment).get(payment::get_payment_status),
        )
        .route("/momo", post(payment::create_momo_payment))
        .route("/zalopay", post(payment::create_zalopay_payment))
        .route(
            "/callback",
            post(payment::payment_callback).get(payment::payment_callback),
        )
}
