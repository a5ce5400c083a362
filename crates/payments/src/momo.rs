//! MoMo wallet gateway (`captureWallet` flow).

use serde::{Deserialize, Serialize};
use tomtat_core::signing::{MomoCallbackSignature, MomoCreateSignature};

use crate::error::PaymentError;
use crate::serde_util::{i64_lenient, string_lenient};
use crate::{http_client, CreatedOrder};

/// Sandbox create endpoint.
pub const DEFAULT_MOMO_ENDPOINT: &str = "https://test-payment.momo.vn/v2/gateway/api/create";

const REQUEST_TYPE: &str = "captureWallet";

/// Merchant credentials.
#[derive(Debug, Clone, Default)]
pub struct MomoConfig {
    pub partner_code: String,
    pub access_key: String,
    pub secret_key: String,
    pub endpoint: String,
}

impl MomoConfig {
    pub fn is_configured(&self) -> bool {
        !self.partner_code.is_empty() && !self.access_key.is_empty() && !self.secret_key.is_empty()
    }
}

/// One payment to create. `order_id` doubles as the request id.
#[derive(Debug, Clone)]
pub struct MomoOrder {
    pub order_id: String,
    pub amount: i64,
    pub order_info: String,
    pub redirect_url: String,
    pub ipn_url: String,
    pub extra_data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateRequest<'a> {
    partner_code: &'a str,
    access_key: &'a str,
    request_id: &'a str,
    amount: i64,
    order_id: &'a str,
    order_info: &'a str,
    redirect_url: &'a str,
    ipn_url: &'a str,
    extra_data: &'a str,
    request_type: &'a str,
    signature: String,
    lang: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateResponse {
    #[serde(deserialize_with = "i64_lenient")]
    result_code: i64,
    #[serde(default)]
    message: String,
    pay_url: Option<String>,
}

/// IPN body MoMo posts to the callback URL.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MomoCallback {
    pub partner_code: String,
    pub order_id: String,
    pub request_id: String,
    #[serde(deserialize_with = "i64_lenient")]
    pub amount: i64,
    #[serde(default)]
    pub order_info: String,
    #[serde(default)]
    pub order_type: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub trans_id: String,
    #[serde(deserialize_with = "i64_lenient")]
    pub result_code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub pay_type: String,
    #[serde(default, deserialize_with = "i64_lenient")]
    pub response_time: i64,
    #[serde(default)]
    pub extra_data: String,
    pub signature: String,
}

impl MomoCallback {
    /// `resultCode == 0` means the user paid.
    pub fn is_success(&self) -> bool {
        self.result_code == 0
    }
}

/// Client for the MoMo create API.
pub struct MomoClient {
    client: reqwest::Client,
    config: MomoConfig,
}

impl MomoClient {
    pub fn new(config: MomoConfig) -> Self {
        Self {
            client: http_client(),
            config,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    /// Create a payment and return its checkout URL.
    pub async fn create_payment(&self, order: &MomoOrder) -> Result<CreatedOrder, PaymentError> {
        if !self.is_configured() {
            return Err(PaymentError::NotConfigured("MoMo"));
        }

        let signature = MomoCreateSignature {
            access_key: &self.config.access_key,
            amount: order.amount,
            extra_data: &order.extra_data,
            ipn_url: &order.ipn_url,
            order_id: &order.order_id,
            order_info: &order.order_info,
            partner_code: &self.config.partner_code,
            redirect_url: &order.redirect_url,
            request_id: &order.order_id,
            request_type: REQUEST_TYPE,
        }
        .sign(&self.config.secret_key);

        let body = CreateRequest {
            partner_code: &self.config.partner_code,
            access_key: &self.config.access_key,
            request_id: &order.order_id,
            amount: order.amount,
            order_id: &order.order_id,
            order_info: &order.order_info,
            redirect_url: &order.redirect_url,
            ipn_url: &order.ipn_url,
            extra_data: &order.extra_data,
            request_type: REQUEST_TYPE,
            signature,
            lang: "vi",
        };

        tracing::debug!(order_id = %order.order_id, amount = order.amount, "Creating MoMo payment");
        let raw: serde_json::Value = self
            .client
            .post(&self.config.endpoint)
            .json(&body)
            .send()
            .await?
            .json()
            .await?;

        let parsed: CreateResponse = serde_json::from_value(raw.clone())
            .map_err(|e| PaymentError::InvalidResponse(e.to_string()))?;
        if parsed.result_code != 0 {
            return Err(PaymentError::Rejected {
                code: parsed.result_code,
                message: parsed.message,
            });
        }
        let payment_url = parsed
            .pay_url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| PaymentError::InvalidResponse("missing payUrl".to_string()))?;

        Ok(CreatedOrder {
            payment_url,
            response: raw,
        })
    }

    /// Recompute the IPN signature and compare it with the one received.
    ///
    /// Always `false` without credentials: an empty secret would make any
    /// signature forgeable.
    pub fn verify_callback(&self, callback: &MomoCallback) -> bool {
        if !self.is_configured() {
            return false;
        }
        MomoCallbackSignature {
            access_key: &self.config.access_key,
            amount: callback.amount,
            extra_data: &callback.extra_data,
            message: &callback.message,
            order_id: &callback.order_id,
            order_info: &callback.order_info,
            order_type: &callback.order_type,
            partner_code: &callback.partner_code,
            pay_type: &callback.pay_type,
            request_id: &callback.request_id,
            response_time: callback.response_time,
            result_code: callback.result_code,
            trans_id: &callback.trans_id,
        }
        .verify(&self.config.secret_key, &callback.signature)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
