/// Errors from the chat-completion layer.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("LLM API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The provider answered without any message content.
    #[error("LLM returned an empty response")]
    EmptyResponse,

    /// No API key is configured.
    #[error("LLM API key is not configured")]
    NotConfigured,
}
