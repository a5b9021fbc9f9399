//! Axum HTTP server: router, listener, graceful shutdown.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::middleware::{self, GeneratedBy};
use crate::params::{ConnectionAddrs, ParamsSource};

/// Build the router: routes, the `X-Generated-By` middleware and request tracing.
pub fn build_router(generator: GeneratedBy, source: ParamsSource) -> Router {
    let routes = Router::new()
        .route("/", get(handle_index))
        .route("/health", get(handle_health))
        .fallback(handle_fallback);

    middleware::apply(routes, generator, source).layer(TraceLayer::new_for_http())
}

/// Build and run the HTTP server.
pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let listen_addr = config.server.listen_address.clone();
    let app = build_router(GeneratedBy::new(), ParamsSource::from(&config.server));

    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    tracing::info!(address = %listen_addr, "generated-by listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<ConnectionAddrs>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("generated-by shut down gracefully");
    Ok(())
}

/// GET / — service banner.
async fn handle_index() -> Response {
    axum::Json(serde_json::json!({
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
    .into_response()
}

/// Health check endpoint.
async fn handle_health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

async fn handle_fallback() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "not found")
}

/// Wait for SIGINT (Ctrl+C) for graceful shutdown.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
