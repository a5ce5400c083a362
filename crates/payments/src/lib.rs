//! MoMo and ZaloPay gateway clients.
//!
//! Order creation signs the provider's request template and POSTs it to the
//! gateway; callbacks are verified against the same HMAC scheme before any
//! of their fields are trusted. Signing templates live in
//! [`tomtat_core::signing`].

pub mod callback;
pub mod error;
pub mod momo;
mod serde_util;
pub mod zalopay;

pub use callback::CallbackPayload;
pub use error::PaymentError;
pub use momo::{MomoCallback, MomoClient, MomoConfig, MomoOrder};
pub use zalopay::{ZaloPayCallback, ZaloPayCallbackData, ZaloPayClient, ZaloPayConfig, ZaloPayOrder};

/// A gateway order that was accepted and can be paid.
#[derive(Debug, Clone)]
pub struct CreatedOrder {
    /// Checkout page the user is redirected to.
    pub payment_url: String,
    /// Raw gateway answer, stored with the transaction.
    pub response: serde_json::Value,
}

/// HTTP timeout for gateway calls.
pub(crate) const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(15);

pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .expect("Failed to build reqwest HTTP client")
}
