//! Plan purchases through MoMo and ZaloPay.
//!
//! `create` records a pending transaction and returns the gateway checkout
//! URL. The gateway later calls `callback`; only a callback whose signature
//! verifies, whose amount matches and whose transaction is still pending
//! upgrades the buyer's plan.

use axum::body::Bytes;
use axum::extract::{Query, RawQuery, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tomtat_core::error::CoreError;
use tomtat_core::ids;
use tomtat_core::plans::{PaymentProvider, PurchasablePlan};
use tomtat_core::types::Timestamp;
use tomtat_db::models::payment::{CreatePaymentTransaction, PaymentTransaction};
use tomtat_db::models::status::PaymentStatus;
use tomtat_db::repositories::PaymentRepo;
use tomtat_payments::zalopay::{embed_data, parse_callback_data, single_item};
use tomtat_payments::{
    CallbackPayload, CreatedOrder, MomoCallback, MomoOrder, ZaloPayCallback, ZaloPayOrder,
};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::usage;

/// Pending transactions stop being payable after this many minutes.
pub const PAYMENT_EXPIRY_MINUTES: i64 = 15;

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub plan_type: Option<String>,
    pub payment_provider: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentResponse {
    pub success: bool,
    pub payment_url: String,
    pub transaction_id: String,
    pub amount: i64,
    pub plan_type: PurchasablePlan,
    pub payment_provider: PaymentProvider,
}

fn parse_plan(plan_type: Option<&str>) -> AppResult<PurchasablePlan> {
    let raw = plan_type.ok_or_else(|| AppError::BadRequest("Thiếu loại gói".into()))?;
    PurchasablePlan::parse(raw)
        .ok_or_else(|| AppError::BadRequest(format!("Loại gói không hợp lệ: {raw}")))
}

/// POST /api/payment/create
pub async fn create_payment(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreatePaymentRequest>,
) -> AppResult<Json<CreatePaymentResponse>> {
    let plan = parse_plan(input.plan_type.as_deref())?;
    let raw_provider = input
        .payment_provider
        .ok_or_else(|| AppError::BadRequest("Thiếu cổng thanh toán".into()))?;
    let provider = PaymentProvider::parse(&raw_provider).ok_or_else(|| {
        AppError::BadRequest(format!("Cổng thanh toán không hợp lệ: {raw_provider}"))
    })?;

    start_payment(&state, &auth, plan, provider).await.map(Json)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderPaymentRequest {
    pub plan_type: Option<String>,
}

/// POST /api/payment/momo
pub async fn create_momo_payment(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<ProviderPaymentRequest>,
) -> AppResult<Json<CreatePaymentResponse>> {
    let plan = parse_plan(input.plan_type.as_deref())?;
    start_payment(&state, &auth, plan, PaymentProvider::Momo)
        .await
        .map(Json)
}

/// POST /api/payment/zalopay
pub async fn create_zalopay_payment(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<ProviderPaymentRequest>,
) -> AppResult<Json<CreatePaymentResponse>> {
    let plan = parse_plan(input.plan_type.as_deref())?;
    start_payment(&state, &auth, plan, PaymentProvider::ZaloPay)
        .await
        .map(Json)
}

async fn start_payment(
    state: &AppState,
    auth: &AuthUser,
    plan: PurchasablePlan,
    provider: PaymentProvider,
) -> AppResult<CreatePaymentResponse> {
    let user = usage::load_user(state, auth).await?;
    let now = Utc::now();
    let transaction_id = ids::transaction_id(now);
    let amount = plan.amount_vnd();
    let redirect_url = state.config.payment_redirect_url(&transaction_id);
    let callback_url = state.config.payment_callback_url();

    let (provider_order_id, created): (String, CreatedOrder) = match provider {
        PaymentProvider::Momo => {
            let order = MomoOrder {
                order_id: ids::momo_order_id(now),
                amount,
                order_info: plan.description().to_string(),
                redirect_url,
                ipn_url: callback_url,
                extra_data: String::new(),
            };
            let created = state.momo.create_payment(&order).await?;
            (order.order_id, created)
        }
        PaymentProvider::ZaloPay => {
            let order = ZaloPayOrder {
                app_trans_id: ids::zalopay_app_trans_id(now),
                app_user: user.external_id.clone(),
                amount,
                app_time: now.timestamp_millis(),
                description: plan.description().to_string(),
                embed_data: embed_data(&redirect_url, &transaction_id),
                item: single_item(plan.as_str(), plan.description(), amount),
                callback_url,
            };
            let created = state.zalopay.create_order(&order).await?;
            (order.app_trans_id, created)
        }
    };

    let transaction = PaymentRepo::create(
        &state.pool,
        &CreatePaymentTransaction {
            transaction_id,
            user_id: user.id,
            provider,
            plan,
            amount,
            provider_order_id,
            provider_response: Some(created.response),
            expires_at: now + Duration::minutes(PAYMENT_EXPIRY_MINUTES),
        },
    )
    .await?;

    tracing::info!(
        user_id = user.id,
        transaction_id = %transaction.transaction_id,
        provider = provider.as_str(),
        plan = plan.as_str(),
        amount,
        "Payment created"
    );

    Ok(CreatePaymentResponse {
        success: true,
        payment_url: created.payment_url,
        transaction_id: transaction.transaction_id,
        amount,
        plan_type: plan,
        payment_provider: provider,
    })
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusParams {
    pub transaction_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusResponse {
    pub transaction_id: String,
    pub status: String,
    pub plan_type: String,
    pub amount: i64,
    pub payment_provider: String,
    pub expires_at: Timestamp,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl PaymentStatusResponse {
    fn new(t: PaymentTransaction, now: Timestamp) -> Self {
        Self {
            status: t.reported_status(now).to_string(),
            transaction_id: t.transaction_id,
            plan_type: t.plan_type,
            amount: t.amount,
            payment_provider: t.payment_provider,
            expires_at: t.expires_at,
            completed_at: t.completed_at,
            created_at: t.created_at,
        }
    }
}

/// GET /api/payment/create?transactionId=...
///
/// Status of one of the caller's transactions.
pub async fn get_payment_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<StatusParams>,
) -> AppResult<Json<PaymentStatusResponse>> {
    let transaction_id = params
        .transaction_id
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::BadRequest("Thiếu mã giao dịch".into()))?;

    let user = usage::load_user(&state, &auth).await?;
    let transaction = PaymentRepo::find_by_transaction_id(&state.pool, &transaction_id)
        .await?
        .filter(|t| t.user_id == user.id)
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "giao dịch",
                id: transaction_id.clone(),
            })
        })?;

    Ok(Json(PaymentStatusResponse::new(transaction, Utc::now())))
}

// ---------------------------------------------------------------------------
// Callback
// ---------------------------------------------------------------------------

/// MoMo IPN acknowledgement.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct MomoAck {
    #[serde(rename = "RspCode")]
    pub rsp_code: &'static str,
    #[serde(rename = "Message")]
    pub message: &'static str,
}

impl MomoAck {
    const SUCCESS: MomoAck = MomoAck {
        rsp_code: "00",
        message: "Success",
    };
    const FAILED: MomoAck = MomoAck {
        rsp_code: "01",
        message: "Payment failed",
    };
}

/// ZaloPay callback acknowledgement.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ZaloPayAck {
    pub return_code: i32,
    pub return_message: &'static str,
}

impl ZaloPayAck {
    fn new(return_code: i32, return_message: &'static str) -> Self {
        Self {
            return_code,
            return_message,
        }
    }
}

/// Collect callback fields into one JSON object, whichever way they came:
/// JSON body, form body, or query string.
pub fn callback_fields(headers: &HeaderMap, query: Option<&str>, body: &[u8]) -> AppResult<Value> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if content_type.contains("application/json") {
        return serde_json::from_slice(body)
            .map_err(|_| AppError::BadRequest("Invalid JSON".into()));
    }

    let encoded = if content_type.contains("application/x-www-form-urlencoded") {
        body
    } else {
        query.unwrap_or_default().as_bytes()
    };
    let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(encoded)
        .map_err(|_| AppError::BadRequest("Invalid form data".into()))?;
    let object: Map<String, Value> = pairs
        .into_iter()
        .map(|(k, v)| (k, Value::String(v)))
        .collect();
    Ok(Value::Object(object))
}

/// POST|GET /api/payment/callback
pub async fn payment_callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> AppResult<Response> {
    let fields = callback_fields(&headers, query.as_deref(), &body)?;

    match CallbackPayload::detect(&fields)? {
        Some(CallbackPayload::Momo(callback)) => {
            handle_momo(&state, &callback, &fields).await.map(|ack| Json(ack).into_response())
        }
        Some(CallbackPayload::ZaloPay(callback)) => {
            handle_zalopay(&state, &callback, &fields).await.map(|ack| Json(ack).into_response())
        }
        None => {
            tracing::warn!("Payment callback from unknown provider");
            Err(AppError::BadRequest("Unknown payment provider".into()))
        }
    }
}

/// Outcome of applying a verified, successful callback to a transaction.
enum Settlement {
    /// Completed now or by an earlier callback.
    Completed,
    /// Not payable (failed, or amount mismatch).
    Rejected,
}

/// Complete `transaction` if it is pending and the paid amount matches.
async fn settle(
    state: &AppState,
    transaction: &PaymentTransaction,
    paid_amount: i64,
    provider_trans_id: &str,
    fields: &Value,
) -> AppResult<Settlement> {
    match transaction.status() {
        Some(PaymentStatus::Completed) => {
            tracing::info!(transaction_id = %transaction.transaction_id, "Repeated callback for completed payment");
            return Ok(Settlement::Completed);
        }
        Some(PaymentStatus::Failed) => return Ok(Settlement::Rejected),
        _ => {}
    }

    if paid_amount != transaction.amount {
        tracing::warn!(
            transaction_id = %transaction.transaction_id,
            expected = transaction.amount,
            paid = paid_amount,
            "Payment amount mismatch"
        );
        PaymentRepo::mark_failed(&state.pool, transaction.id, Some(fields)).await?;
        return Ok(Settlement::Rejected);
    }

    let provider_trans_id = Some(provider_trans_id).filter(|id| !id.is_empty());
    match PaymentRepo::mark_completed(
        &state.pool,
        transaction.id,
        provider_trans_id,
        Some(fields),
        Utc::now(),
    )
    .await?
    {
        Some((payment, user)) => {
            tracing::info!(
                transaction_id = %payment.transaction_id,
                user_id = user.id,
                plan = %user.subscription,
                "Payment completed, subscription upgraded"
            );
            Ok(Settlement::Completed)
        }
        // Lost a race with another callback for the same transaction.
        None => {
            let current =
                PaymentRepo::find_by_transaction_id(&state.pool, &transaction.transaction_id)
                    .await?;
            match current.and_then(|t| t.status()) {
                Some(PaymentStatus::Completed) => Ok(Settlement::Completed),
                _ => Ok(Settlement::Rejected),
            }
        }
    }
}

async fn handle_momo(state: &AppState, callback: &MomoCallback, fields: &Value) -> AppResult<MomoAck> {
    if !state.momo.verify_callback(callback) {
        tracing::warn!(order_id = %callback.order_id, "MoMo signature verification failed");
        return Err(AppError::BadRequest("Invalid signature".into()));
    }

    let Some(transaction) =
        PaymentRepo::find_by_provider_order_id(&state.pool, PaymentProvider::Momo, &callback.order_id)
            .await?
    else {
        tracing::warn!(order_id = %callback.order_id, "MoMo callback for unknown order");
        return Ok(MomoAck::FAILED);
    };

    if !callback.is_success() {
        tracing::info!(
            transaction_id = %transaction.transaction_id,
            result_code = callback.result_code,
            message = %callback.message,
            "MoMo payment not successful"
        );
        if transaction.status() == Some(PaymentStatus::Completed) {
            return Ok(MomoAck::SUCCESS);
        }
        PaymentRepo::mark_failed(&state.pool, transaction.id, Some(fields)).await?;
        return Ok(MomoAck::FAILED);
    }

    match settle(state, &transaction, callback.amount, &callback.trans_id, fields).await? {
        Settlement::Completed => Ok(MomoAck::SUCCESS),
        Settlement::Rejected => Ok(MomoAck::FAILED),
    }
}

async fn handle_zalopay(
    state: &AppState,
    callback: &ZaloPayCallback,
    fields: &Value,
) -> AppResult<ZaloPayAck> {
    if !state.zalopay.verify_callback(callback) {
        tracing::warn!("ZaloPay MAC verification failed");
        return Ok(ZaloPayAck::new(-1, "Invalid MAC"));
    }

    let data = match parse_callback_data(&callback.data) {
        Ok(data) => data,
        Err(e) => {
            tracing::warn!(error = %e, "Malformed ZaloPay callback data");
            return Ok(ZaloPayAck::new(0, "Invalid data"));
        }
    };

    let Some(transaction) =
        PaymentRepo::find_by_provider_order_id(
            &state.pool,
            PaymentProvider::ZaloPay,
            &data.app_trans_id,
        )
        .await?
    else {
        tracing::warn!(app_trans_id = %data.app_trans_id, "ZaloPay callback for unknown order");
        return Ok(ZaloPayAck::new(0, "Transaction not found"));
    };

    match settle(state, &transaction, data.amount, &data.zp_trans_id, fields).await? {
        Settlement::Completed => Ok(ZaloPayAck::new(1, "Success")),
        Settlement::Rejected => Ok(ZaloPayAck::new(0, "Payment processing failed")),
    }
}
