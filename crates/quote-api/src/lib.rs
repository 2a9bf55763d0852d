//! HTTP surface (spec §6), grounded on `crates/autopilot/src/infra/api.rs`'s
//! `axum::Router<State>` + `tower_http::trace::TraceLayer` assembly and
//! `axum::serve(..).with_graceful_shutdown(..)` shutdown pattern.

mod health;
mod metrics;
mod providers;
mod quotes;
mod rate_limit;
mod state;

pub use metrics::ApiMetrics;
pub use state::ApiState;

use std::{net::SocketAddr, sync::Arc};

use axum::{routing::get, Router};
use tokio::sync::oneshot;
use tower_http::trace::TraceLayer;

/// The primary surface: `/api/quotes` and `/api/providers*`, rate-limited
/// per caller IP (spec §6).
pub async fn serve(
    address: SocketAddr,
    state: ApiState,
    client_rate_limit_per_second: u32,
    shutdown: oneshot::Receiver<()>,
) -> Result<(), std::io::Error> {
    let limiter = rate_limit::build_limiter(client_rate_limit_per_second);

    let app = Router::new()
        .route("/api/quotes", get(quotes::get_quotes))
        .route("/api/providers", get(providers::list_providers))
        .route("/api/providers/{id}", get(providers::get_provider))
        .with_state(state)
        .layer(axum::middleware::from_fn_with_state(limiter, rate_limit::enforce))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(%address, "serving quote aggregator HTTP API");

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(async {
            shutdown.await.ok();
        })
        .await
}

/// The ambient liveness/Prometheus surface, bound to its own address the
/// way `shared::metrics::serve_metrics` is served separately from the
/// primary API in `crates/autopilot/src/lib.rs::main`.
pub async fn serve_metrics(
    address: SocketAddr,
    metrics: Arc<ApiMetrics>,
    shutdown: oneshot::Receiver<()>,
) -> Result<(), std::io::Error> {
    let app = Router::new()
        .route("/healthz", get(health::healthz))
        .route("/metrics", get(health::metrics))
        .with_state(metrics);

    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(%address, "serving metrics");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown.await.ok();
        })
        .await
}
