//! HTTP surface of the relay: the JSON wire API plus request tracing.

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tower_http::trace::{DefaultOnFailure, DefaultOnResponse};
use tower_http::LatencyUnit;

pub mod api;
mod config;
mod handlers;

pub use config::{body_limit_for, Config};
pub use handlers::not_found_handler;

use crate::ServiceState;

/// Assemble the relay router with its body limit and fallback
pub fn app(config: &Config, state: ServiceState) -> Router {
    Router::new()
        .merge(api::router(state.clone()))
        .nest(&format!("/{}", api::API_PREFIX), api::router(state.clone()))
        .fallback(handlers::not_found_handler)
        .layer(DefaultBodyLimit::max(config.body_limit))
        .with_state(state)
}

/// Serve the relay on an already bound listener until `shutdown_rx` fires
pub async fn run(
    listener: TcpListener,
    config: Config,
    state: ServiceState,
    mut shutdown_rx: watch::Receiver<()>,
) -> Result<(), HttpServerError> {
    let log_level = config.log_level;
    let trace_layer = TraceLayer::new_for_http()
        .on_response(
            DefaultOnResponse::new()
                .include_headers(false)
                .level(log_level)
                .latency_unit(LatencyUnit::Micros),
        )
        .on_failure(DefaultOnFailure::new().latency_unit(LatencyUnit::Micros));

    let router = app(&config, state).layer(trace_layer);

    tracing::info!(addr = ?listener.local_addr()?, "relay listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.changed().await;
        })
        .await?;

    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum HttpServerError {
    #[error("an error occurred running the HTTP server: {0}")]
    ServingFailed(#[from] std::io::Error),
}
