//! Tonal Server - HTTP API for palette generation.
//!
//! This crate provides:
//! - `GET /gen-palette/{hex}` tonal palettes with text-color annotations
//! - `GET /api/contrast/...` WCAG contrast checks
//! - `GET /api/health` liveness
//! - Per-client rate limiting, security headers, CORS and compression
//!
//! All palette logic lives in `tonal-core`; handlers only parse requests and
//! serialize results.

#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state};
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub use config::ServerConfig;
pub use error::{AppError, AppResult};
pub use state::AppState;

/// Run the server with the given configuration.
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    run_with_shutdown(config, std::future::pending()).await
}

/// Run the server with graceful shutdown support.
///
/// Once `shutdown` resolves the server stops accepting connections and waits
/// up to `shutdown_timeout` for in-flight requests.
pub async fn run_with_shutdown<F>(config: ServerConfig, shutdown: F) -> anyhow::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let addr = config.socket_addr()?;
    let grace = config.shutdown_timeout_duration();

    let state = Arc::new(AppState::new(config));
    let cleanup = state.start_cleanup_task();
    let app = create_router_with_state(state);

    let listener = TcpListener::bind(addr).await?;
    info!("Starting palette server on {}", listener.local_addr()?);

    let signalled = Arc::new(Notify::new());
    let trigger = Arc::clone(&signalled);
    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        shutdown.await;
        info!("Shutdown signal received, draining connections");
        trigger.notify_one();
    });

    let mut server = std::pin::pin!(server.into_future());
    tokio::select! {
        result = &mut server => result?,
        () = async {
            signalled.notified().await;
            tokio::time::sleep(grace).await;
        } => {
            warn!("Graceful shutdown timed out after {:?}, closing", grace);
        }
    }

    cleanup.abort();
    info!("Server stopped");
    Ok(())
}

/// Build the router with fresh state for `config`.
pub fn create_router(config: ServerConfig) -> Router {
    create_router_with_state(Arc::new(AppState::new(config)))
}

/// Build the router around shared state.
///
/// Layer order, outermost first: request id, trace, timing log, CORS,
/// security headers, compression, rate limit, timeout.
pub fn create_router_with_state(state: Arc<AppState>) -> Router {
    api::routes()
        .layer(from_fn_with_state(
            Arc::clone(&state),
            middleware::timeout_middleware,
        ))
        .layer(from_fn_with_state(
            Arc::clone(&state),
            middleware::rate_limit_middleware,
        ))
        .layer(middleware::compression_layer())
        .layer(from_fn(middleware::security_headers_middleware))
        .layer(middleware::cors_layer(&state.config.cors_origins))
        .layer(from_fn(middleware::timing_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(middleware::request_id_middleware))
        .with_state(state)
}
