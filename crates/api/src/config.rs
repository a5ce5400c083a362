use tomtat_core::plans::{
    PlanLimits, DEFAULT_FREE_DAILY_LIMIT, DEFAULT_PRO_DAILY_LIMIT, DEFAULT_TRIAL_DAILY_LIMIT,
};
use tomtat_core::quota::DEFAULT_DAILY_REWARD_BONUS;
use tomtat_payments::momo::DEFAULT_MOMO_ENDPOINT;
use tomtat_payments::zalopay::DEFAULT_ZALOPAY_ENDPOINT;
use tomtat_payments::{MomoConfig, ZaloPayConfig};

use crate::auth::jwt::AuthConfig;

/// hCaptcha verification endpoint.
pub const DEFAULT_HCAPTCHA_VERIFY_URL: &str = "https://hcaptcha.com/siteverify";

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development except the auth
/// key. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `60`).
    pub request_timeout_secs: u64,
    /// Public base URL of the web app, used for share links and payment
    /// redirect/callback URLs.
    pub app_url: String,
    /// Access-token validation.
    pub auth: AuthConfig,
    /// Daily limits and reward sizes.
    pub quota: QuotaConfig,
    pub llm: LlmConfig,
    pub cache: CacheConfig,
    pub momo: MomoConfig,
    pub zalopay: ZaloPayConfig,
    pub captcha: CaptchaConfig,
}

/// Plan limits and reward sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaConfig {
    pub limits: PlanLimits,
    /// Bonus uses granted by the daily reward.
    pub daily_reward_bonus: i32,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            limits: PlanLimits::default(),
            daily_reward_bonus: DEFAULT_DAILY_REWARD_BONUS,
        }
    }
}

/// Chat-completion API credentials.
#[derive(Debug, Clone, Default)]
pub struct LlmConfig {
    /// Empty when unset; LLM calls then fail with a configuration error.
    pub api_key: String,
    pub base_url: Option<String>,
}

/// Result cache backend.
#[derive(Debug, Clone, Default)]
pub struct CacheConfig {
    /// Caching is disabled when unset.
    pub redis_url: Option<String>,
}

/// hCaptcha server-side verification.
#[derive(Debug, Clone)]
pub struct CaptchaConfig {
    /// Every token is rejected when unset.
    pub secret_key: Option<String>,
    pub verify_url: String,
}

impl Default for CaptchaConfig {
    fn default() -> Self {
        Self {
            secret_key: None,
            verify_url: DEFAULT_HCAPTCHA_VERIFY_URL.to_string(),
        }
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_i32(name: &str, default: i32) -> i32 {
    std::env::var(name)
        .map(|v| {
            v.parse()
                .unwrap_or_else(|_| panic!("{name} must be a valid i32"))
        })
        .unwrap_or(default)
}

/// Split a comma-separated list, dropping blanks.
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Base URL without a trailing slash.
fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                                   |
    /// |------------------------|-------------------------------------------|
    /// | `HOST`                 | `0.0.0.0`                                 |
    /// | `PORT`                 | `3000`                                    |
    /// | `CORS_ORIGINS`         | `http://localhost:3000`                   |
    /// | `REQUEST_TIMEOUT_SECS` | `60`                                      |
    /// | `APP_URL`              | `http://localhost:3000`                   |
    /// | `OPENAI_API_KEY`       | --                                        |
    /// | `OPENAI_BASE_URL`      | `https://api.openai.com/v1`               |
    /// | `REDIS_URL`            | -- (cache disabled)                       |
    /// | `FREE_DAILY_LIMIT`     | `5`                                       |
    /// | `TRIAL_DAILY_LIMIT`    | `15`                                      |
    /// | `PRO_DAILY_LIMIT`      | `100`                                     |
    /// | `DAILY_REWARD_BONUS`   | `3`                                       |
    /// | `MOMO_PARTNER_CODE`    | --                                        |
    /// | `MOMO_ACCESS_KEY`      | --                                        |
    /// | `MOMO_SECRET_KEY`      | --                                        |
    /// | `MOMO_ENDPOINT`        | MoMo sandbox create URL                   |
    /// | `ZALOPAY_APP_ID`       | --                                        |
    /// | `ZALOPAY_KEY1`         | --                                        |
    /// | `ZALOPAY_KEY2`         | --                                        |
    /// | `ZALOPAY_ENDPOINT`     | ZaloPay sandbox create URL                |
    /// | `HCAPTCHA_SECRET_KEY`  | --                                        |
    ///
    /// Auth variables are documented on [`AuthConfig::from_env`].
    pub fn from_env() -> Self {
        let host = env_or("HOST", "0.0.0.0");

        let port: u16 = env_or("PORT", "3000")
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins = parse_list(&env_or("CORS_ORIGINS", "http://localhost:3000"));

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", "60")
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let app_url = normalize_base_url(&env_or("APP_URL", "http://localhost:3000"));

        let quota = QuotaConfig {
            limits: PlanLimits {
                free: env_i32("FREE_DAILY_LIMIT", DEFAULT_FREE_DAILY_LIMIT),
                trial: env_i32("TRIAL_DAILY_LIMIT", DEFAULT_TRIAL_DAILY_LIMIT),
                pro: env_i32("PRO_DAILY_LIMIT", DEFAULT_PRO_DAILY_LIMIT),
            },
            daily_reward_bonus: env_i32("DAILY_REWARD_BONUS", DEFAULT_DAILY_REWARD_BONUS),
        };

        let llm = LlmConfig {
            api_key: env_or("OPENAI_API_KEY", ""),
            base_url: env_opt("OPENAI_BASE_URL").map(|u| normalize_base_url(&u)),
        };

        let cache = CacheConfig {
            redis_url: env_opt("REDIS_URL"),
        };

        let momo = MomoConfig {
            partner_code: env_or("MOMO_PARTNER_CODE", ""),
            access_key: env_or("MOMO_ACCESS_KEY", ""),
            secret_key: env_or("MOMO_SECRET_KEY", ""),
            endpoint: env_or("MOMO_ENDPOINT", DEFAULT_MOMO_ENDPOINT),
        };

        let zalopay = ZaloPayConfig {
            app_id: env_or("ZALOPAY_APP_ID", ""),
            key1: env_or("ZALOPAY_KEY1", ""),
            key2: env_or("ZALOPAY_KEY2", ""),
            endpoint: env_or("ZALOPAY_ENDPOINT", DEFAULT_ZALOPAY_ENDPOINT),
        };

        let captcha = CaptchaConfig {
            secret_key: env_opt("HCAPTCHA_SECRET_KEY"),
            verify_url: DEFAULT_HCAPTCHA_VERIFY_URL.to_string(),
        };

        let auth = AuthConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            app_url,
            auth,
            quota,
            llm,
            cache,
            momo,
            zalopay,
            captcha,
        }
    }

    /// Where gateways send the user after checkout.
    pub fn payment_redirect_url(&self, transaction_id: &str) -> String {
        format!("{}/payment/success?txn={transaction_id}", self.app_url)
    }

    /// Server-to-server payment notification URL.
    pub fn payment_callback_url(&self) -> String {
        format!("{}/api/payment/callback", self.app_url)
    }

    /// Public URL of a shared record.
    pub fn share_url(&self, share_id: &str) -> String {
        format!("{}/shared/{share_id}", self.app_url)
    }
}
