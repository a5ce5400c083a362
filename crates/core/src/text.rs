//! Input text helpers: HTML extraction, length limits, title parsing.

use std::sync::LazyLock;

use regex::Regex;

/// Minimum characters required before summarizing.
pub const SUMMARY_MIN_CHARS: usize = 50;

/// Summarize input is truncated to this many characters.
pub const SUMMARY_MAX_CHARS: usize = 10_000;

/// Maximum input for the guest summary endpoint.
pub const GUEST_SUMMARY_MAX_CHARS: usize = 5_000;

/// Maximum input for the other guest endpoints.
pub const GUEST_TEXT_MAX_CHARS: usize = 3_000;

/// Upper bound for the number of generated titles.
pub const MAX_TITLE_COUNT: usize = 10;

/// Default number of generated titles.
pub const DEFAULT_TITLE_COUNT: usize = 3;

static SCRIPT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").expect("valid regex"));
static STYLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style[^>]*>.*?</style>").expect("valid regex"));
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));
static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static NUMBERING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s*").expect("valid regex"));
static BULLET_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-\s*").expect("valid regex"));

/// Reduce an HTML document to its visible text.
///
/// Drops `<script>` and `<style>` blocks, strips remaining tags and collapses
/// whitespace runs to single spaces.
pub fn extract_text_from_html(html: &str) -> String {
    let text = SCRIPT_RE.replace_all(html, "");
    let text = STYLE_RE.replace_all(&text, "");
    let text = TAG_RE.replace_all(&text, "");
    WS_RE.replace_all(&text, " ").trim().to_string()
}

/// Number of Unicode scalar values in `text`.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Truncate to at most `max` characters, appending `...` when anything was cut.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

/// Whitespace-separated word count.
pub fn word_count(text: &str) -> i32 {
    i32::try_from(text.split_whitespace().count()).unwrap_or(i32::MAX)
}

/// Clamp a requested title count into `1..=MAX_TITLE_COUNT`.
pub fn clamp_title_count(count: Option<i64>) -> usize {
    match count {
        None => DEFAULT_TITLE_COUNT,
        Some(n) => usize::try_from(n.max(1))
            .unwrap_or(DEFAULT_TITLE_COUNT)
            .min(MAX_TITLE_COUNT),
    }
}

/// Split an LLM reply into individual titles.
///
/// Empty lines are skipped, leading `1.` numbering and `-` bullets removed,
/// and at most `count` titles are returned.
pub fn parse_title_lines(reply: &str, count: usize) -> Vec<String> {
    reply
        .trim()
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let line = NUMBERING_RE.replace(line.trim(), "");
            BULLET_RE.replace(&line, "").trim().to_string()
        })
        .take(count)
        .collect()
}
