//! Deterministic cache keys for LLM results.

use crate::hashing::sha256_hex;

/// Namespace prefix for every cached result.
pub const CACHE_PREFIX: &str = "summary:";

/// Time-to-live for cached results: 7 days.
pub const CACHE_TTL_SECS: u64 = 60 * 60 * 24 * 7;

/// Normalize input text before hashing: trim surrounding whitespace and lowercase.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Build the cache key for `text` processed in `mode`.
///
/// Inputs that differ only in surrounding whitespace or letter case share a
/// key; the same text in two modes never does.
pub fn cache_key(mode: &str, text: &str) -> String {
    let material = format!("{mode}:{}", normalize(text));
    format!("{CACHE_PREFIX}{}", sha256_hex(material.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_normalized_input_same_key() {
        assert_eq!(
            cache_key("brief", "  Hà Nội là thủ đô  "),
            cache_key("brief", "hà nội là thủ đô")
        );
    }

    #[test]
    fn mode_changes_key() {
        assert_ne!(
            cache_key("brief", "văn bản"),
            cache_key("detailed", "văn bản")
        );
    }

    #[test]
    fn key_is_prefixed_hex_digest() {
        let key = cache_key("bullet", "abc");
        let digest = key.strip_prefix(CACHE_PREFIX).unwrap();
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn inner_whitespace_is_significant() {
        assert_ne!(cache_key("brief", "a b"), cache_key("brief", "ab"));
    }
}
