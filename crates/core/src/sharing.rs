//! Public share links for saved summaries.

use chrono::Duration;
use rand::RngCore;

use crate::types::Timestamp;

/// Share links stay valid for 30 days.
pub const SHARE_TTL_DAYS: i64 = 30;

/// Generate an unguessable share id: 16 random bytes as 32 hex chars.
pub fn generate_share_id() -> String {
    let mut bytes = [0u8; 16];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Expiry timestamp for a link created at `now`.
pub fn share_expiry(now: Timestamp) -> Timestamp {
    now + Duration::days(SHARE_TTL_DAYS)
}

/// Whether a link with the given expiry is no longer valid at `now`.
///
/// Links without an expiry never expire.
pub fn is_share_expired(expires_at: Option<Timestamp>, now: Timestamp) -> bool {
    matches!(expires_at, Some(at) if at < now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn share_id_is_32_hex_chars_and_random() {
        let a = generate_share_id();
        let b = generate_share_id();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn expiry_is_thirty_days_out() {
        let now = Utc::now();
        assert_eq!(share_expiry(now) - now, Duration::days(30));
    }

    #[test]
    fn expired_only_after_deadline() {
        let now = Utc::now();
        assert!(!is_share_expired(None, now));
        assert!(!is_share_expired(Some(now + Duration::seconds(1)), now));
        assert!(is_share_expired(Some(now - Duration::seconds(1)), now));
    }
}
