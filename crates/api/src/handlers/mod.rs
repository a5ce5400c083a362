pub mod features;
pub mod guest;
pub mod payment;
pub mod referrals;
pub mod rewards;
pub mod shared;
pub mod summaries;
pub mod summarize;
pub mod user;

use tomtat_core::error::CoreError;
use tomtat_core::text::char_len;

use crate::error::AppResult;

/// Trimmed, non-empty input text.
pub(crate) fn require_text(text: Option<String>) -> AppResult<String> {
    match text.map(|t| t.trim().to_string()) {
        Some(t) if !t.is_empty() => Ok(t),
        _ => Err(CoreError::Validation("Vui lòng nhập văn bản".into()).into()),
    }
}

/// [`require_text`] plus a character limit for guest endpoints.
pub(crate) fn require_guest_text(text: Option<String>, max_chars: usize) -> AppResult<String> {
    let text = require_text(text)?;
    if char_len(&text) > max_chars {
        return Err(CoreError::Validation(format!(
            "Văn bản quá dài. Khách chỉ được dùng tối đa {max_chars} ký tự."
        ))
        .into());
    }
    Ok(text)
}
