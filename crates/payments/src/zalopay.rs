//! ZaloPay gateway (v2 create-order API).

use serde::{Deserialize, Serialize};
use serde_json::json;
use tomtat_core::signing::{verify_zalopay_callback, ZaloPayOrderMac};

use crate::error::PaymentError;
use crate::serde_util::{i64_lenient, string_lenient};
use crate::{http_client, CreatedOrder};

/// Sandbox create endpoint.
pub const DEFAULT_ZALOPAY_ENDPOINT: &str = "https://sb-openapi.zalopay.vn/v2/create";

/// Merchant credentials. `key1` signs orders, `key2` verifies callbacks.
#[derive(Debug, Clone, Default)]
pub struct ZaloPayConfig {
    pub app_id: String,
    pub key1: String,
    pub key2: String,
    pub endpoint: String,
}

impl ZaloPayConfig {
    pub fn is_configured(&self) -> bool {
        !self.app_id.is_empty() && !self.key1.is_empty() && !self.key2.is_empty()
    }
}

/// One order to create.
#[derive(Debug, Clone)]
pub struct ZaloPayOrder {
    pub app_trans_id: String,
    pub app_user: String,
    pub amount: i64,
    /// Milliseconds since the Unix epoch.
    pub app_time: i64,
    pub description: String,
    pub embed_data: String,
    pub item: String,
    pub callback_url: String,
}

/// `embed_data` JSON: where to send the user afterwards and our transaction id.
pub fn embed_data(redirect_url: &str, transaction_id: &str) -> String {
    json!({ "redirecturl": redirect_url, "transactionId": transaction_id }).to_string()
}

/// `item` JSON describing a single purchased package.
pub fn single_item(id: &str, name: &str, price: i64) -> String {
    json!([{ "itemid": id, "itemname": name, "itemprice": price, "itemquantity": 1 }]).to_string()
}

#[derive(Debug, Serialize)]
struct CreateRequest<'a> {
    app_id: &'a str,
    app_trans_id: &'a str,
    app_user: &'a str,
    app_time: i64,
    amount: i64,
    description: &'a str,
    bank_code: &'a str,
    item: &'a str,
    embed_data: &'a str,
    callback_url: &'a str,
    mac: String,
}

#[derive(Debug, Deserialize)]
struct CreateResponse {
    #[serde(deserialize_with = "i64_lenient")]
    return_code: i64,
    #[serde(default)]
    return_message: String,
    #[serde(alias = "orderurl")]
    order_url: Option<String>,
}

/// Callback body: the signed `data` JSON string and its MAC.
#[derive(Debug, Clone, Deserialize)]
pub struct ZaloPayCallback {
    pub data: String,
    pub mac: String,
}

/// Fields of the callback `data` JSON that the server uses.
#[derive(Debug, Clone, Deserialize)]
pub struct ZaloPayCallbackData {
    pub app_trans_id: String,
    #[serde(deserialize_with = "i64_lenient")]
    pub amount: i64,
    #[serde(default, deserialize_with = "string_lenient")]
    pub zp_trans_id: String,
    #[serde(default)]
    pub app_user: String,
    #[serde(default)]
    pub embed_data: String,
}

/// Parse the callback `data` string. Only call after the MAC was verified.
pub fn parse_callback_data(data: &str) -> Result<ZaloPayCallbackData, PaymentError> {
    serde_json::from_str(data).map_err(|e| PaymentError::InvalidCallback(e.to_string()))
}

/// Client for the ZaloPay create API.
pub struct ZaloPayClient {
    client: reqwest::Client,
    config: ZaloPayConfig,
}

impl ZaloPayClient {
    pub fn new(config: ZaloPayConfig) -> Self {
        Self {
            client: http_client(),
            config,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    /// Create an order and return its checkout URL.
    pub async fn create_order(&self, order: &ZaloPayOrder) -> Result<CreatedOrder, PaymentError> {
        if !self.is_configured() {
            return Err(PaymentError::NotConfigured("ZaloPay"));
        }

        let mac = ZaloPayOrderMac {
            app_id: &self.config.app_id,
            app_trans_id: &order.app_trans_id,
            app_user: &order.app_user,
            amount: order.amount,
            app_time: order.app_time,
            embed_data: &order.embed_data,
            item: &order.item,
        }
        .sign(&self.config.key1);

        let form = CreateRequest {
            app_id: &self.config.app_id,
            app_trans_id: &order.app_trans_id,
            app_user: &order.app_user,
            app_time: order.app_time,
            amount: order.amount,
            description: &order.description,
            bank_code: "",
            item: &order.item,
            embed_data: &order.embed_data,
            callback_url: &order.callback_url,
            mac,
        };

        tracing::debug!(app_trans_id = %order.app_trans_id, amount = order.amount, "Creating ZaloPay order");
        let raw: serde_json::Value = self
            .client
            .post(&self.config.endpoint)
            .form(&form)
            .send()
            .await?
            .json()
            .await?;

        let parsed: CreateResponse = serde_json::from_value(raw.clone())
            .map_err(|e| PaymentError::InvalidResponse(e.to_string()))?;
        if parsed.return_code != 1 {
            return Err(PaymentError::Rejected {
                code: parsed.return_code,
                message: parsed.return_message,
            });
        }
        let payment_url = parsed
            .order_url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| PaymentError::InvalidResponse("missing order_url".to_string()))?;

        Ok(CreatedOrder {
            payment_url,
            response: raw,
        })
    }

    /// Check the callback MAC (HMAC of `data` under key2). Always `false`
    /// when the client has no credentials.
    pub fn verify_callback(&self, callback: &ZaloPayCallback) -> bool {
        self.is_configured()
            && verify_zalopay_callback(&self.config.key2, &callback.data, &callback.mac)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
