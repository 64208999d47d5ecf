use std::sync::Arc;

use draft_gateway::config::{CredentialSource, EnvCredential, GatewayConfig};
use draft_gateway::constants::API_KEY_ENV_VAR;
use draft_gateway::services::dispatcher::DraftDispatcher;
use draft_gateway::services::rate_limit::{AdmissionControl, FixedWindowLimiter, start_sweeper};
use draft_gateway::services::upstream::ChatCompletionsClient;
use draft_gateway::{AppState, build_app};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = GatewayConfig::from_env();

    let backend = ChatCompletionsClient::new(
        &config.upstream_url,
        &config.upstream_model,
        config.upstream_timeout,
    )
    .expect("Failed to build upstream HTTP client");

    // The key is read per request; its absence only degrades the draft endpoint
    let credentials = EnvCredential::default();
    if credentials.api_key().is_none() {
        tracing::warn!("{} is not set, drafts will fail until it is", API_KEY_ENV_VAR);
    }

    let admission: Arc<dyn AdmissionControl> =
        Arc::new(FixedWindowLimiter::new(config.rate_limit.clone()));

    let state = Arc::new(AppState {
        admission: admission.clone(),
        dispatcher: DraftDispatcher::new(Arc::new(backend), Arc::new(credentials)),
    });

    tokio::spawn(start_sweeper(admission, config.sweep_interval));

    let app = build_app(state, config.max_body_bytes);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind to {}: {}", addr, e));

    tracing::info!(
        model = %config.upstream_model,
        max_requests = config.rate_limit.max_requests,
        window_secs = config.rate_limit.window.as_secs(),
        "Listening on http://{}",
        addr
    );
    tracing::info!(
        "[sweeper] Background sweeper started ({}s interval)",
        config.sweep_interval.as_secs()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server failed");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
