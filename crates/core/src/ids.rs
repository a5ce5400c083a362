//! Identifier generators for transactions, provider orders and referrals.

use chrono::Duration;
use rand::distr::{Alphanumeric, SampleString};
use rand::Rng;

use crate::types::Timestamp;

/// ZaloPay dates its `app_trans_id` in Vietnam time (UTC+7).
const VIETNAM_OFFSET_HOURS: i64 = 7;

fn random_alnum(len: usize) -> String {
    Alphanumeric.sample_string(&mut rand::rng(), len)
}

/// Internal transaction id: `TXN<millis><7 uppercase alphanumerics>`.
pub fn transaction_id(now: Timestamp) -> String {
    format!(
        "TXN{}{}",
        now.timestamp_millis(),
        random_alnum(7).to_ascii_uppercase()
    )
}

/// MoMo order id (also used as request id): `VSUM_<millis>_<7 lowercase alphanumerics>`.
pub fn momo_order_id(now: Timestamp) -> String {
    format!(
        "VSUM_{}_{}",
        now.timestamp_millis(),
        random_alnum(7).to_ascii_lowercase()
    )
}

/// ZaloPay `app_trans_id`: `yyMMdd_<6 digits>`, date in Vietnam time.
pub fn zalopay_app_trans_id(now: Timestamp) -> String {
    let local = now + Duration::hours(VIETNAM_OFFSET_HOURS);
    let suffix: u32 = rand::rng().random_range(0..1_000_000);
    format!("{}_{suffix:06}", local.format("%y%m%d"))
}

/// Referral code: 8 uppercase alphanumerics.
pub fn referral_code() -> String {
    random_alnum(8).to_ascii_uppercase()
}
