//! HMAC-SHA256 signing for the MoMo and ZaloPay payment gateways.
//!
//! Both providers sign a plain string assembled from request fields. The field
//! order and separators below are part of each provider's contract and must
//! not change: a single transposed field produces a signature the gateway
//! rejects (on create) or that we reject (on callback).

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Compute the lowercase hex HMAC-SHA256 of `message` under `key`.
pub fn hmac_sha256_hex(key: &str, message: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(key.as_bytes()).expect("HMAC accepts any key length");
    mac.update(message.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Verify a hex signature in constant time.
///
/// Returns `false` for malformed hex instead of erroring; a signature that
/// cannot be decoded is simply not a valid signature.
pub fn verify_hmac_sha256_hex(key: &str, message: &str, signature_hex: &str) -> bool {
    let Ok(expected) = hex::decode(signature_hex.trim().to_ascii_lowercase()) else {
        return false;
    };
    let mut mac = match HmacSha256::new_from_slice(key.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(message.as_bytes());
    mac.verify_slice(&expected).is_ok()
}

// ---------------------------------------------------------------------------
// MoMo
// ---------------------------------------------------------------------------

/// Fields signed when creating a MoMo payment.
#[derive(Debug, Clone)]
pub struct MomoCreateSignature<'a> {
    pub access_key: &'a str,
    pub amount: i64,
    pub extra_data: &'a str,
    pub ipn_url: &'a str,
    pub order_id: &'a str,
    pub order_info: &'a str,
    pub partner_code: &'a str,
    pub redirect_url: &'a str,
    pub request_id: &'a str,
    pub request_type: &'a str,
}

impl MomoCreateSignature<'_> {
    /// The raw string MoMo expects to be signed, fields in alphabetical order.
    pub fn raw(&self) -> String {
        format!(
            "accessKey={}&amount={}&extraData={}&ipnUrl={}&orderId={}&orderInfo={}\
             &partnerCode={}&redirectUrl={}&requestId={}&requestType={}",
            self.access_key,
            self.amount,
            self.extra_data,
            self.ipn_url,
            self.order_id,
            self.order_info,
            self.partner_code,
            self.redirect_url,
            self.request_id,
            self.request_type,
        )
    }

    pub fn sign(&self, secret_key: &str) -> String {
        hmac_sha256_hex(secret_key, &self.raw())
    }
}

/// Fields signed by MoMo on its IPN callback.
#[derive(Debug, Clone)]
pub struct MomoCallbackSignature<'a> {
    pub access_key: &'a str,
    pub amount: i64,
    pub extra_data: &'a str,
    pub message: &'a str,
    pub order_id: &'a str,
    pub order_info: &'a str,
    pub order_type: &'a str,
    pub partner_code: &'a str,
    pub pay_type: &'a str,
    pub request_id: &'a str,
    pub response_time: i64,
    pub result_code: i64,
    pub trans_id: &'a str,
}

impl MomoCallbackSignature<'_> {
    pub fn raw(&self) -> String {
        format!(
            "accessKey={}&amount={}&extraData={}&message={}&orderId={}&orderInfo={}\
             &orderType={}&partnerCode={}&payType={}&requestId={}&responseTime={}\
             &resultCode={}&transId={}",
            self.access_key,
            self.amount,
            self.extra_data,
            self.message,
            self.order_id,
            self.order_info,
            self.order_type,
            self.partner_code,
            self.pay_type,
            self.request_id,
            self.response_time,
            self.result_code,
            self.trans_id,
        )
    }

    pub fn verify(&self, secret_key: &str, signature: &str) -> bool {
        verify_hmac_sha256_hex(secret_key, &self.raw(), signature)
    }
}

// ---------------------------------------------------------------------------
// ZaloPay
// ---------------------------------------------------------------------------

/// Fields signed (with key1) when creating a ZaloPay order.
#[derive(Debug, Clone)]
pub struct ZaloPayOrderMac<'a> {
    pub app_id: &'a str,
    pub app_trans_id: &'a str,
    pub app_user: &'a str,
    pub amount: i64,
    pub app_time: i64,
    pub embed_data: &'a str,
    pub item: &'a str,
}

impl ZaloPayOrderMac<'_> {
    /// `app_id|app_trans_id|app_user|amount|app_time|embed_data|item`
    pub fn raw(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}|{}|{}",
            self.app_id,
            self.app_trans_id,
            self.app_user,
            self.amount,
            self.app_time,
            self.embed_data,
            self.item,
        )
    }

    pub fn sign(&self, key1: &str) -> String {
        hmac_sha256_hex(key1, &self.raw())
    }
}

/// Verify a ZaloPay callback: the MAC covers the raw `data` string, keyed with key2.
pub fn verify_zalopay_callback(key2: &str, data: &str, mac: &str) -> bool {
    verify_hmac_sha256_hex(key2, data, mac)
}
