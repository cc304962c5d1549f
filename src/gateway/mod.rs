//! Axum-based HTTP gateway.
//!
//! Exposes the ability's three webhook surfaces plus a health probe:
//! - `POST /trigger` — broadcast the quickstart packet to enabled users
//! - `GET /enable` — signed enable-flow redirect
//! - `POST /action` — platform action webhook (validate/disable)
//! - `GET /health` — liveness probe

mod handlers;

use handlers::{handle_action, handle_enable, handle_health, handle_trigger};

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{
    Router,
    http::StatusCode,
    routing::{get, post},
};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

use crate::config::Config;
use crate::platform::{EnableUrls, KeyService, PacketCipher, PacketCrypto, PlatformClient, Publisher};
use crate::store::UserStateStore;

/// Maximum request body size (64KB) — prevents memory exhaustion
pub const MAX_BODY_SIZE: usize = 65_536;
/// Request timeout (30s) — prevents slow-loris attacks
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Shared state for all axum handlers
#[derive(Clone)]
pub struct AppState {
    pub shared_secret: Arc<str>,
    pub integration_id: Arc<str>,
    pub store: Arc<UserStateStore>,
    pub keys: Arc<dyn KeyService>,
    pub crypto: Arc<dyn PacketCrypto>,
    pub publisher: Arc<dyn Publisher>,
    pub enable_urls: Arc<EnableUrls>,
}

/// `sharedSecret` query parameter carried by `/trigger` and `/action`.
#[derive(serde::Deserialize)]
pub struct SharedSecretQuery {
    #[serde(rename = "sharedSecret")]
    pub shared_secret: Option<String>,
}

/// Query parameters of the signed `/enable` redirect.
#[derive(serde::Deserialize)]
pub struct EnableQuery {
    pub signature: Option<String>,
    pub state: Option<String>,
    pub timestamp: Option<String>,
}

/// Run the HTTP gateway.
pub async fn run_gateway(config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.gateway.host, config.gateway.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    run_gateway_with_listener(listener, config).await
}

/// Run the HTTP gateway from a pre-bound listener.
pub async fn run_gateway_with_listener(
    listener: tokio::net::TcpListener,
    config: Config,
) -> Result<()> {
    let platform = Arc::new(PlatformClient::new(&config)?);
    let cipher = Arc::new(PacketCipher::new(&config.api_secret));
    let enable_urls = Arc::new(EnableUrls::new(&config.platform.enable_url)?);

    let state = AppState {
        shared_secret: Arc::from(config.shared_secret.as_str()),
        integration_id: Arc::from(config.integration_id.as_str()),
        store: Arc::new(UserStateStore::new()),
        keys: platform.clone(),
        crypto: cipher,
        publisher: platform,
        enable_urls,
    };

    let app = Router::new()
        .route("/health", get(handle_health))
        .route("/trigger", post(handle_trigger))
        .route("/enable", get(handle_enable))
        .route("/action", post(handle_action))
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
        ));

    let addr = listener.local_addr()?;
    tracing::info!("ability gateway listening on {addr}");
    tracing::info!("  POST /trigger  — broadcast to enabled users");
    tracing::info!("  GET  /enable   — signed enable-flow redirect");
    tracing::info!("  POST /action   — platform action webhook");
    tracing::info!("  GET  /health   — liveness probe");

    axum::serve(listener, app).await?;

    Ok(())
}
