/// Errors from the payment gateways.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The gateway answered but refused to create the order.
    #[error("Gateway rejected the order ({code}): {message}")]
    Rejected { code: i64, message: String },

    /// The gateway answer could not be understood.
    #[error("Invalid gateway response: {0}")]
    InvalidResponse(String),

    /// Required credentials are missing.
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    /// A callback body is missing fields or is malformed.
    #[error("Invalid callback: {0}")]
    InvalidCallback(String),
}
