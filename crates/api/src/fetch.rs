//! Fetching article text from a user-supplied URL.

use std::time::Duration;

use tomtat_core::text::extract_text_from_html;

/// Give up on slow pages after this long.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Bytes of a page read before the rest is dropped. Summaries only use the
/// first few thousand characters of text.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Unsupported URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP status {0}")]
    Status(u16),
}

/// Downloads pages and reduces them to visible text.
#[derive(Clone)]
pub struct UrlFetcher {
    client: reqwest::Client,
}

impl Default for UrlFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl UrlFetcher {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { client }
    }

    /// GET `url` and return its text content. Only `http` and `https` URLs
    /// are accepted.
    pub async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let parsed =
            reqwest::Url::parse(url.trim()).map_err(|_| FetchError::InvalidUrl(url.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::InvalidUrl(url.to_string()));
        }

        let mut response = self.client.get(parsed).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let capacity = response
            .content_length()
            .map_or(0, |len| (len as usize).min(MAX_BODY_BYTES));
        let mut body = Vec::with_capacity(capacity);
        while let Some(chunk) = response.chunk().await? {
            let room = MAX_BODY_BYTES - body.len();
            if chunk.len() >= room {
                body.extend_from_slice(&chunk[..room]);
                tracing::debug!(url = %url, limit = MAX_BODY_BYTES, "Page truncated at size limit");
                break;
            }
            body.extend_from_slice(&chunk);
        }

        let html = String::from_utf8_lossy(&body);
        Ok(extract_text_from_html(&html))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use axum::http::StatusCode;
    use axum::response::Html;
    use axum::routing::get;
    use axum::Router;

    async fn spawn_site() -> String {
        let app = Router::new()
            .route(
                "/article",
                get(|| async {
                    Html("<html><script>track()</script><body><p>Xin   chào</p></body></html>")
                }),
            )
            .route("/missing", get(|| async { StatusCode::NOT_FOUND }))
            .route(
                "/huge",
                get(|| async { "tu ".repeat(MAX_BODY_BYTES) }),
            );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn fetches_and_extracts_text() {
        let base = spawn_site().await;
        let text = UrlFetcher::new()
            .fetch_text(&format!("{base}/article"))
            .await
            .unwrap();
        assert_eq!(text, "Xin chào");
    }

    #[tokio::test]
    async fn oversized_page_is_cut_at_limit() {
        let base = spawn_site().await;
        let text = UrlFetcher::new()
            .fetch_text(&format!("{base}/huge"))
            .await
            .unwrap();
        assert!(text.starts_with("tu tu"));
        assert!(text.len() <= MAX_BODY_BYTES);
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let base = spawn_site().await;
        let result = UrlFetcher::new().fetch_text(&format!("{base}/missing")).await;
        assert_matches!(result, Err(FetchError::Status(404)));
    }

    #[tokio::test]
    async fn non_http_schemes_are_rejected() {
        let fetcher = UrlFetcher::new();
        assert_matches!(
            fetcher.fetch_text("file:///etc/passwd").await,
            Err(FetchError::InvalidUrl(_))
        );
        assert_matches!(
            fetcher.fetch_text("not a url").await,
            Err(FetchError::InvalidUrl(_))
        );
    }
}
