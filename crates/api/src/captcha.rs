//! hCaptcha server-side verification.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::CaptchaConfig;

const VERIFY_TIMEOUT: Duration = Duration::from_secs(10);

/// Checks a client-supplied captcha token.
#[async_trait]
pub trait CaptchaVerifier: Send + Sync {
    /// `true` only when the provider confirmed the token. Any failure reads
    /// as `false`.
    async fn verify(&self, token: &str) -> bool;
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    #[serde(default)]
    success: bool,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

/// Verifier backed by the hCaptcha `siteverify` API.
pub struct HCaptchaVerifier {
    client: reqwest::Client,
    config: CaptchaConfig,
}

impl HCaptchaVerifier {
    pub fn new(config: CaptchaConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(VERIFY_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { client, config }
    }

    async fn siteverify(&self, secret: &str, token: &str) -> Result<VerifyResponse, reqwest::Error> {
        self.client
            .post(&self.config.verify_url)
            .form(&[("secret", secret), ("response", token)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }
}

#[async_trait]
impl CaptchaVerifier for HCaptchaVerifier {
    async fn verify(&self, token: &str) -> bool {
        let Some(secret) = self.config.secret_key.as_deref() else {
            tracing::warn!("HCAPTCHA_SECRET_KEY is not set, rejecting captcha");
            return false;
        };

        match self.siteverify(secret, token).await {
            Ok(resp) => {
                if !resp.success {
                    tracing::debug!(error_codes = ?resp.error_codes, "Captcha rejected");
                }
                resp.success
            }
            Err(e) => {
                tracing::warn!(error = %e, "hCaptcha verification failed");
                false
            }
        }
    }
}
