use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tomtat_core::error::CoreError;
use tomtat_llm::LlmError;
use tomtat_payments::PaymentError;

/// Generic message for any 500 response.
const INTERNAL_MESSAGE: &str = "Có lỗi xảy ra. Vui lòng thử lại sau.";

/// Shown when the daily allowance is used up.
pub const QUOTA_EXCEEDED_MESSAGE: &str =
    "Bạn đã hết lượt sử dụng hôm nay. Hãy nâng cấp tài khoản hoặc quay lại vào ngày mai.";

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors, the upstream client errors, and
/// adds HTTP-specific variants. Implements [`IntoResponse`] to produce
/// consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `tomtat_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The chat-completion API failed.
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// A payment gateway failed.
    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        INTERNAL_MESSAGE.to_string(),
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Quota errors carry the caller's usage alongside the message.
        if let AppError::Core(CoreError::QuotaExceeded(usage)) = &self {
            let body = json!({
                "error": QUOTA_EXCEEDED_MESSAGE,
                "code": "QUOTA_EXCEEDED",
                "usage": usage,
            });
            return (StatusCode::TOO_MANY_REQUESTS, axum::Json(body)).into_response();
        }

        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("Không tìm thấy {entity} ({id})"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::Gone(msg) => (StatusCode::GONE, "GONE", msg.clone()),
                CoreError::QuotaExceeded(_) => (
                    StatusCode::TOO_MANY_REQUESTS,
                    "QUOTA_EXCEEDED",
                    QUOTA_EXCEEDED_MESSAGE.to_string(),
                ),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    internal()
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- Upstream errors ---
            AppError::Llm(LlmError::NotConfigured) => {
                tracing::error!("LLM API key is not configured");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CONFIGURATION_ERROR",
                    "Lỗi cấu hình API. Vui lòng liên hệ hỗ trợ.".to_string(),
                )
            }
            AppError::Llm(err) => {
                tracing::error!(error = %err, "LLM request failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_ERROR",
                    "Không thể xử lý văn bản lúc này. Vui lòng thử lại sau.".to_string(),
                )
            }
            AppError::Payment(PaymentError::NotConfigured(provider)) => {
                tracing::error!(provider, "Payment gateway is not configured");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CONFIGURATION_ERROR",
                    "Cổng thanh toán chưa được cấu hình.".to_string(),
                )
            }
            AppError::Payment(PaymentError::InvalidCallback(msg)) => {
                (StatusCode::BAD_REQUEST, "INVALID_CALLBACK", msg.clone())
            }
            AppError::Payment(err) => {
                tracing::error!(error = %err, "Payment gateway request failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "PAYMENT_GATEWAY_ERROR",
                    "Không thể tạo thanh toán. Vui lòng thử lại sau.".to_string(),
                )
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Không tìm thấy dữ liệu".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                return (
                    StatusCode::CONFLICT,
                    "CONFLICT",
                    format!("Dữ liệu bị trùng ({constraint})"),
                );
            }
            tracing::error!(error = %db_err, "Database error");
            internal()
        }
        other => {
            tracing::error!(error = %other, "Database error");
            internal()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tomtat_core::quota::UsageInfo;

    #[test]
    fn status_mapping() {
        let cases: Vec<(AppError, StatusCode)> = vec![
            (
                CoreError::Validation("x".into()).into(),
                StatusCode::BAD_REQUEST,
            ),
            (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (
                CoreError::Unauthorized("x".into()).into(),
                StatusCode::UNAUTHORIZED,
            ),
            (CoreError::Forbidden("x".into()).into(), StatusCode::FORBIDDEN),
            (
                CoreError::NotFound {
                    entity: "bản tóm tắt",
                    id: "7".into(),
                }
                .into(),
                StatusCode::NOT_FOUND,
            ),
            (CoreError::Conflict("x".into()).into(), StatusCode::CONFLICT),
            (CoreError::Gone("x".into()).into(), StatusCode::GONE),
            (
                LlmError::EmptyResponse.into(),
                StatusCode::BAD_GATEWAY,
            ),
            (
                LlmError::NotConfigured.into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                PaymentError::Rejected {
                    code: 22,
                    message: "x".into(),
                }
                .into(),
                StatusCode::BAD_GATEWAY,
            ),
            (
                sqlx::Error::RowNotFound.into(),
                StatusCode::NOT_FOUND,
            ),
            (
                AppError::InternalError("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            let rendered = format!("{err:?}");
            assert_eq!(err.into_response().status(), expected, "{rendered}");
        }
    }

    #[test]
    fn quota_exceeded_is_429() {
        let usage = UsageInfo {
            can_use: false,
            remaining_uses: 0,
            used_today: 5,
            daily_limit: 5,
            bonus_uses: 0,
            monthly_usage: 5,
            subscription: "Free".into(),
            reset_date: NaiveDate::from_ymd_opt(2026, 5, 14).unwrap(),
        };
        let response = AppError::Core(CoreError::QuotaExceeded(usage)).into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
