use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tomtat_api::captcha::HCaptchaVerifier;
use tomtat_api::config::ServerConfig;
use tomtat_api::fetch::UrlFetcher;
use tomtat_api::router::build_app_router;
use tomtat_api::state::AppState;
use tomtat_cache::{DisabledCache, RedisCache, SummaryCache};
use tomtat_llm::OpenAiClient;
use tomtat_payments::{MomoClient, ZaloPayClient};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tomtat_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, app_url = %config.app_url, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = tomtat_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    tomtat_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    tomtat_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Cache ---
    let cache: Arc<dyn SummaryCache> = match config.cache.redis_url.as_deref() {
        Some(url) => match RedisCache::connect(url).await {
            Ok(cache) => Arc::new(cache),
            Err(e) => {
                tracing::warn!(error = %e, "Redis unavailable, running without cache");
                Arc::new(DisabledCache)
            }
        },
        None => {
            tracing::info!("REDIS_URL not set, running without cache");
            Arc::new(DisabledCache)
        }
    };

    // --- Upstream services ---
    if config.llm.api_key.is_empty() {
        tracing::warn!("OPENAI_API_KEY is not set, text features will fail");
    }
    let llm = Arc::new(OpenAiClient::new(
        config.llm.api_key.clone(),
        config.llm.base_url.clone(),
    ));

    let momo = Arc::new(MomoClient::new(config.momo.clone()));
    if !momo.is_configured() {
        tracing::warn!("MoMo credentials missing, MoMo payments disabled");
    }
    let zalopay = Arc::new(ZaloPayClient::new(config.zalopay.clone()));
    if !zalopay.is_configured() {
        tracing::warn!("ZaloPay credentials missing, ZaloPay payments disabled");
    }

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        llm,
        cache,
        captcha: Arc::new(HCaptchaVerifier::new(config.captcha.clone())),
        fetcher: UrlFetcher::new(),
        momo,
        zalopay,
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Resolve on SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
