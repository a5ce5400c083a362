//! Provider detection for the shared callback endpoint.

use serde_json::Value;

use crate::error::PaymentError;
use crate::momo::MomoCallback;
use crate::zalopay::ZaloPayCallback;

/// A callback body attributed to one gateway, not yet verified.
#[derive(Debug, Clone)]
pub enum CallbackPayload {
    Momo(MomoCallback),
    ZaloPay(ZaloPayCallback),
}

impl CallbackPayload {
    /// Work out which gateway sent `fields`.
    ///
    /// `fields` is the callback as a JSON object, however it arrived (JSON
    /// body, form body or query string). MoMo is recognised by `partnerCode`,
    /// ZaloPay by `data` together with `mac`. Returns `Ok(None)` when neither
    /// matches.
    pub fn detect(fields: &Value) -> Result<Option<Self>, PaymentError> {
        let Some(object) = fields.as_object() else {
            return Ok(None);
        };

        if object.contains_key("partnerCode") {
            let callback = serde_json::from_value(fields.clone())
                .map_err(|e| PaymentError::InvalidCallback(e.to_string()))?;
            return Ok(Some(CallbackPayload::Momo(callback)));
        }

        if object.contains_key("data") && object.contains_key("mac") {
            let callback = serde_json::from_value(fields.clone())
                .map_err(|e| PaymentError::InvalidCallback(e.to_string()))?;
            return Ok(Some(CallbackPayload::ZaloPay(callback)));
        }

        Ok(None)
    }
}
