//! Prompt catalogue for every text feature.
//!
//! Each builder returns a [`PromptSpec`]: the model, the system and user
//! messages, and the sampling parameters for one chat-completion call. Newer
//! models only accept `max_completion_tokens` and a fixed temperature, so the
//! token limit is tagged with the field it must be sent as.

/// How the completion length limit is sent to the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenLimit {
    /// Legacy `max_tokens` field.
    MaxTokens(u32),
    /// `max_completion_tokens` field required by reasoning-era models.
    MaxCompletionTokens(u32),
}

/// A fully rendered chat-completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptSpec {
    pub model: &'static str,
    pub system: String,
    pub user: String,
    pub limit: TokenLimit,
    pub temperature: Option<f32>,
}

// ---------------------------------------------------------------------------
// Feature options
// ---------------------------------------------------------------------------

/// Summary style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SummaryMode {
    #[default]
    Brief,
    Detailed,
    Bullet,
}

impl SummaryMode {
    /// Parse a wire value, falling back to `brief` for anything unknown.
    pub fn parse_or_default(s: Option<&str>) -> Self {
        match s {
            Some("detailed") => SummaryMode::Detailed,
            Some("bullet") => SummaryMode::Bullet,
            _ => SummaryMode::Brief,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SummaryMode::Brief => "brief",
            SummaryMode::Detailed => "detailed",
            SummaryMode::Bullet => "bullet",
        }
    }

    fn instruction(self) -> &'static str {
        match self {
            SummaryMode::Brief => {
                "Tóm tắt ngắn gọn văn bản sau đây bằng tiếng Việt, chỉ giữ lại những ý chính nhất:"
            }
            SummaryMode::Detailed => {
                "Tóm tắt chi tiết văn bản sau đây bằng tiếng Việt, bao gồm các ý chính và các điểm quan trọng:"
            }
            SummaryMode::Bullet => {
                "Tóm tắt văn bản sau đây bằng tiếng Việt dưới dạng danh sách gạch đầu dòng, mỗi điểm là một ý chính:"
            }
        }
    }
}

/// Supported language pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    ViEn,
    EnVi,
    ViZh,
    ZhVi,
    ViJa,
    JaVi,
    ViKo,
    KoVi,
}

impl Direction {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "vi-en" => Some(Direction::ViEn),
            "en-vi" => Some(Direction::EnVi),
            "vi-zh" => Some(Direction::ViZh),
            "zh-vi" => Some(Direction::ZhVi),
            "vi-ja" => Some(Direction::ViJa),
            "ja-vi" => Some(Direction::JaVi),
            "vi-ko" => Some(Direction::ViKo),
            "ko-vi" => Some(Direction::KoVi),
            _ => None,
        }
    }

    /// Parse `s`, using `default` when absent or unknown.
    pub fn parse_or(s: Option<&str>, default: Direction) -> Self {
        s.and_then(Direction::parse).unwrap_or(default)
    }

    pub fn code(self) -> &'static str {
        match self {
            Direction::ViEn => "vi-en",
            Direction::EnVi => "en-vi",
            Direction::ViZh => "vi-zh",
            Direction::ZhVi => "zh-vi",
            Direction::ViJa => "vi-ja",
            Direction::JaVi => "ja-vi",
            Direction::ViKo => "vi-ko",
            Direction::KoVi => "ko-vi",
        }
    }

    /// (source, target) language names in English.
    fn english_names(self) -> (&'static str, &'static str) {
        match self {
            Direction::ViEn => ("Vietnamese", "English"),
            Direction::EnVi => ("English", "Vietnamese"),
            Direction::ViZh => ("Vietnamese", "Chinese"),
            Direction::ZhVi => ("Chinese", "Vietnamese"),
            Direction::ViJa => ("Vietnamese", "Japanese"),
            Direction::JaVi => ("Japanese", "Vietnamese"),
            Direction::ViKo => ("Vietnamese", "Korean"),
            Direction::KoVi => ("Korean", "Vietnamese"),
        }
    }

    /// (source, target) language names in Vietnamese.
    fn vietnamese_names(self) -> (&'static str, &'static str) {
        match self {
            Direction::ViEn => ("tiếng Việt", "tiếng Anh"),
            Direction::EnVi => ("tiếng Anh", "tiếng Việt"),
            Direction::ViZh => ("tiếng Việt", "tiếng Trung"),
            Direction::ZhVi => ("tiếng Trung", "tiếng Việt"),
            Direction::ViJa => ("tiếng Việt", "tiếng Nhật"),
            Direction::JaVi => ("tiếng Nhật", "tiếng Việt"),
            Direction::ViKo => ("tiếng Việt", "tiếng Hàn"),
            Direction::KoVi => ("tiếng Hàn", "tiếng Việt"),
        }
    }
}

/// Reading level for simplification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SimplifyLevel {
    Basic,
    #[default]
    Medium,
    Advanced,
}

impl SimplifyLevel {
    pub fn parse_or_default(s: Option<&str>) -> Self {
        match s {
            Some("basic") => SimplifyLevel::Basic,
            Some("advanced") => SimplifyLevel::Advanced,
            _ => SimplifyLevel::Medium,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SimplifyLevel::Basic => "basic",
            SimplifyLevel::Medium => "medium",
            SimplifyLevel::Advanced => "advanced",
        }
    }
}

// ---------------------------------------------------------------------------
// Summarize
// ---------------------------------------------------------------------------

const SUMMARY_EXPERT_SYSTEM: &str = "Bạn là một chuyên gia tóm tắt văn bản tiếng Việt. \
Nhiệm vụ của bạn là tóm tắt nội dung một cách ngắn gọn, chính xác và dễ hiểu.

Quy tắc tóm tắt:
1. Sử dụng tiếng Việt tự nhiên và rõ ràng
2. Tóm tắt thành 3-5 câu chính
3. Giữ lại thông tin quan trọng nhất
4. Loại bỏ chi tiết không cần thiết
5. Sắp xếp thông tin theo thứ tự logic";

const SUMMARY_GUEST_SYSTEM: &str =
    "Bạn là một AI trợ lý chuyên tóm tắt văn bản bằng tiếng Việt. Hãy tóm tắt chính xác và súc tích.";

/// Authenticated summarization.
pub fn summarize(mode: SummaryMode, text: &str) -> PromptSpec {
    PromptSpec {
        model: "gpt-3.5-turbo",
        system: SUMMARY_EXPERT_SYSTEM.to_string(),
        user: format!("{}\n\n{text}", mode.instruction()),
        limit: TokenLimit::MaxTokens(500),
        temperature: Some(0.3),
    }
}

/// Guest summarization.
pub fn guest_summary(mode: SummaryMode, text: &str) -> PromptSpec {
    PromptSpec {
        model: "gpt-5-nano",
        system: SUMMARY_GUEST_SYSTEM.to_string(),
        user: format!("{}\n\n{text}", mode.instruction()),
        limit: TokenLimit::MaxCompletionTokens(1000),
        temperature: None,
    }
}

// ---------------------------------------------------------------------------
// Translate
// ---------------------------------------------------------------------------

/// Authenticated translation: professional-translator system prompt.
pub fn translate(direction: Direction, text: &str) -> PromptSpec {
    let (source, target) = direction.english_names();
    let style = if target == "Vietnamese" {
        "For technical terms, use commonly understood Vietnamese equivalents or keep the \
         original term in parentheses if needed."
    } else {
        "Use clear, professional language."
    };
    let system = format!(
        "You are a professional {source} to {target} translator.\n\
         Translate the following {source} text to {target} naturally and accurately.\n\
         Maintain the original meaning and tone. {style}\n\
         Only return the translated text, no explanations."
    );

    PromptSpec {
        model: "gpt-5-nano",
        system,
        user: text.to_string(),
        limit: TokenLimit::MaxCompletionTokens(2000),
        temperature: None,
    }
}

/// Guest translation: Vietnamese instruction prefixed to the text.
pub fn guest_translate(direction: Direction, text: &str) -> PromptSpec {
    let (source, target) = direction.vietnamese_names();
    PromptSpec {
        model: "gpt-3.5-turbo",
        system: "Bạn là một AI trợ lý chuyên dịch thuật chính xác và tự nhiên giữa các ngôn ngữ. \
                 Hãy dịch chính xác và giữ nguyên ý nghĩa."
            .to_string(),
        user: format!("Dịch văn bản sau từ {source} sang {target}:\n\n{text}"),
        limit: TokenLimit::MaxTokens(1500),
        temperature: Some(0.1),
    }
}

// ---------------------------------------------------------------------------
// Simplify
// ---------------------------------------------------------------------------

fn simplify_system(level: SimplifyLevel) -> &'static str {
    match level {
        SimplifyLevel::Basic => {
            "You are an expert at simplifying Vietnamese text for elementary school students (grade 1-5).
Rewrite the given text using:
- Very simple vocabulary (under 1000 most common Vietnamese words)
- Short sentences (maximum 10 words)
- Basic sentence structures
- Everyday examples
- Remove complex concepts or explain them very simply

Keep the main message but make it understandable for children."
        }
        SimplifyLevel::Medium => {
            "You are an expert at simplifying Vietnamese text for middle school students and general readers.
Rewrite the given text using:
- Common Vietnamese vocabulary (avoid complex terms)
- Clear, medium-length sentences (maximum 15 words)
- Simple sentence structures
- Explain difficult concepts in simple terms
- Conversational but clear tone

Keep all important information but make it easy to understand."
        }
        SimplifyLevel::Advanced => {
            "You are an expert at simplifying Vietnamese text for high school and college students.
Rewrite the given text using:
- Clear, formal Vietnamese vocabulary
- Well-structured sentences (maximum 20 words)
- Logical flow and transitions
- Keep important technical terms but explain them
- Academic but accessible tone

Maintain the original meaning while making it clearer and more organized."
        }
    }
}

/// Authenticated simplification.
pub fn simplify(level: SimplifyLevel, text: &str) -> PromptSpec {
    PromptSpec {
        model: "gpt-3.5-turbo",
        system: format!(
            "{}\n\nOnly return the simplified text, no introduction or explanation.",
            simplify_system(level)
        ),
        user: text.to_string(),
        limit: TokenLimit::MaxTokens(2000),
        temperature: Some(0.3),
    }
}

/// Guest simplification.
pub fn guest_simplify(level: SimplifyLevel, text: &str) -> PromptSpec {
    let instruction = match level {
        SimplifyLevel::Basic => "Viết lại văn bản sau bằng tiếng Việt đơn giản, dễ hiểu cho học sinh tiểu học (sử dụng từ ngữ đơn giản, câu ngắn):",
        SimplifyLevel::Medium => "Viết lại văn bản sau bằng tiếng Việt dễ hiểu cho đại chúng (sử dụng từ ngữ thông dụng, giải thích thuật ngữ phức tạp):",
        SimplifyLevel::Advanced => "Viết lại văn bản sau bằng tiếng Việt rõ ràng và dễ hiểu hơn cho sinh viên (giữ thuật ngữ chuyên ngành nhưng giải thích rõ):",
    };
    PromptSpec {
        model: "gpt-3.5-turbo",
        system: "Bạn là một AI trợ lý chuyên đơn giản hóa văn bản tiếng Việt. \
                 Hãy viết lại văn bản sao cho dễ hiểu hơn mà vẫn giữ nguyên ý nghĩa."
            .to_string(),
        user: format!("{instruction}\n\n{text}"),
        limit: TokenLimit::MaxTokens(1500),
        temperature: Some(0.3),
    }
}

// ---------------------------------------------------------------------------
// Keypoints
// ---------------------------------------------------------------------------

/// Key-point extraction as a bulleted Vietnamese list.
pub fn keypoints(text: &str) -> PromptSpec {
    PromptSpec {
        model: "gpt-4.1-nano",
        system: "You are an expert at extracting key points from Vietnamese text.
Extract the most important key points from the given text and present them as a bulleted list in Vietnamese.
Each point should be:
- Concise and clear (maximum 20 words per point)
- Start with a bullet point (•)
- Capture the main ideas and important details
- Written in simple Vietnamese

Aim for 3-7 key points depending on the text length and complexity.
Only return the bullet points, no introduction or explanation."
            .to_string(),
        user: text.to_string(),
        limit: TokenLimit::MaxCompletionTokens(1000),
        temperature: None,
    }
}

// ---------------------------------------------------------------------------
// Titles
// ---------------------------------------------------------------------------

/// Authenticated title generation as a numbered list.
pub fn title_generator(count: usize, text: &str) -> PromptSpec {
    let example: String = (1..=count)
        .map(|n| format!("{n}. [Title {n}]\n"))
        .collect();
    PromptSpec {
        model: "gpt-3.5-turbo",
        system: format!(
            "You are an expert at creating compelling titles for Vietnamese content.
Generate {count} different titles for the given text that are:
- Engaging and attention-grabbing
- Accurately represent the content
- Written in natural Vietnamese
- Between 5-12 words each
- Different styles (news-style, academic, casual, etc.)

Format the output as a numbered list:
{example}
Only return the numbered list, no introduction or explanation."
        ),
        user: text.to_string(),
        limit: TokenLimit::MaxTokens(500),
        temperature: Some(0.7),
    }
}

/// Guest title generation: one title per line, no numbering.
pub fn guest_title_generator(count: usize, text: &str) -> PromptSpec {
    PromptSpec {
        model: "gpt-4.1-nano",
        system: "Bạn là một AI trợ lý chuyên tạo tiêu đề hấp dẫn và phù hợp cho văn bản tiếng Việt. \
                 Hãy tạo các tiêu đề ngắn gọn, súc tích và thu hút."
            .to_string(),
        user: format!(
            "Tạo {count} tiêu đề hấp dẫn và phù hợp cho văn bản sau \
             (mỗi tiêu đề trên một dòng, không đánh số):\n\n{text}"
        ),
        limit: TokenLimit::MaxCompletionTokens(500),
        temperature: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_options_fall_back_to_defaults() {
        assert_eq!(SummaryMode::parse_or_default(Some("poem")), SummaryMode::Brief);
        assert_eq!(SummaryMode::parse_or_default(None), SummaryMode::Brief);
        assert_eq!(SimplifyLevel::parse_or_default(Some("x")), SimplifyLevel::Medium);
        assert_eq!(
            Direction::parse_or(Some("fr-vi"), Direction::ViEn),
            Direction::ViEn
        );
        assert_eq!(
            Direction::parse_or(Some("ja-vi"), Direction::ViEn),
            Direction::JaVi
        );
    }

    #[test]
    fn direction_codes_round_trip() {
        for code in ["vi-en", "en-vi", "vi-zh", "zh-vi", "vi-ja", "ja-vi", "vi-ko", "ko-vi"] {
            assert_eq!(Direction::parse(code).unwrap().code(), code);
        }
    }

    #[test]
    fn summarize_uses_legacy_token_field() {
        let spec = summarize(SummaryMode::Bullet, "nội dung");
        assert_eq!(spec.model, "gpt-3.5-turbo");
        assert_eq!(spec.limit, TokenLimit::MaxTokens(500));
        assert_eq!(spec.temperature, Some(0.3));
        assert!(spec.user.starts_with("Tóm tắt văn bản sau đây bằng tiếng Việt dưới dạng"));
        assert!(spec.user.ends_with("\n\nnội dung"));
    }

    #[test]
    fn nano_models_have_no_temperature() {
        for spec in [
            guest_summary(SummaryMode::Brief, "a"),
            translate(Direction::EnVi, "a"),
            keypoints("a"),
            guest_title_generator(3, "a"),
        ] {
            assert!(matches!(spec.limit, TokenLimit::MaxCompletionTokens(_)));
            assert_eq!(spec.temperature, None);
        }
    }

    #[test]
    fn translate_prompt_names_both_languages() {
        let spec = translate(Direction::EnVi, "Hello");
        assert!(spec.system.starts_with("You are a professional English to Vietnamese translator."));
        assert_eq!(spec.user, "Hello");

        let guest = guest_translate(Direction::ViKo, "Xin chào");
        assert!(guest.user.starts_with("Dịch văn bản sau từ tiếng Việt sang tiếng Hàn:"));
    }

    #[test]
    fn simplify_prompt_depends_on_level() {
        let basic = simplify(SimplifyLevel::Basic, "x");
        let advanced = simplify(SimplifyLevel::Advanced, "x");
        assert!(basic.system.contains("elementary school"));
        assert!(advanced.system.contains("college students"));
        assert!(basic.system.ends_with("no introduction or explanation."));
    }

    #[test]
    fn title_prompt_mentions_requested_count() {
        let spec = title_generator(5, "x");
        assert!(spec.system.contains("Generate 5 different titles"));
        assert!(spec.system.contains("5. [Title 5]"));
        assert!(guest_title_generator(4, "x").user.starts_with("Tạo 4 tiêu đề"));
    }
}
