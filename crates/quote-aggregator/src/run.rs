//! Wires every crate's concrete implementation together and serves until a
//! shutdown signal arrives, grounded on `crates/autopilot/src/lib.rs::main`'s
//! `tokio::select!` over the metrics server and the main work loop.

use std::{sync::Arc, time::Duration};

use aggregator::{Coordinator, CoordinatorConfig};
use cache::{InMemoryCache, TtlPolicy};
use catalog::Catalog;
use normalizer::Normalizer;
use provider_core::AdapterContext;
use quote_api::{ApiMetrics, ApiState};
use quote_config::Arguments;
use registry::Registry;
use tokio::sync::oneshot;

/// Connect timeout every adapter's shared `reqwest::Client` enforces
/// (spec §4.B leaves this to the implementation); not surfaced as a
/// request-time knob since it bounds TCP setup, not the deadline the
/// executor already governs per call.
const ADAPTER_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub async fn run(args: Arguments) -> anyhow::Result<()> {
    tracing::info!(%args, "starting quote aggregator");

    let catalog = Catalog::new();
    let context = Arc::new(AdapterContext::new(catalog, ADAPTER_CONNECT_TIMEOUT));
    let endpoints = providers::ProviderEndpoints::defaults().with_env_overrides();

    let mut registry = Registry::new();
    providers::register_all(&mut registry, context, &endpoints);
    let registry = Arc::new(registry);

    let ttl = TtlPolicy {
        quote_ttl: args.quote_cache_ttl,
        corridor_ttl: args.corridor_cache_ttl,
        provider_ttl: args.provider_cache_ttl,
        jitter_max: args.jitter_max_seconds,
    };
    let cache = Arc::new(InMemoryCache::new(ttl));

    let coordinator = Coordinator::new(
        catalog,
        registry.clone(),
        Normalizer::new(catalog),
        cache,
        CoordinatorConfig {
            per_provider_timeout: args.per_provider_timeout_ms,
            max_workers: args.aggregator_max_workers,
            max_request_amount: args.max_request_amount,
            single_flight_wait_timeout: args.single_flight_wait_timeout_ms,
        },
    );

    let metrics = Arc::new(ApiMetrics::new());
    let state = ApiState {
        coordinator: Arc::new(coordinator),
        registry,
        catalog,
        metrics: metrics.clone(),
    };

    let (api_shutdown_tx, api_shutdown_rx) = oneshot::channel();
    let (metrics_shutdown_tx, metrics_shutdown_rx) = oneshot::channel();

    let api_handle = tokio::spawn(quote_api::serve(
        args.api_address,
        state,
        args.client_rate_limit_per_second,
        api_shutdown_rx,
    ));
    let metrics_handle = tokio::spawn(quote_api::serve_metrics(args.metrics_address, metrics, metrics_shutdown_rx));

    tokio::signal::ctrl_c().await.ok();
    tracing::info!("received shutdown signal");
    let _ = api_shutdown_tx.send(());
    let _ = metrics_shutdown_tx.send(());

    let (api_result, metrics_result) = tokio::join!(api_handle, metrics_handle);
    if let Ok(Err(error)) = api_result {
        tracing::error!(?error, "api server exited with an error");
    }
    if let Ok(Err(error)) = metrics_result {
        tracing::error!(?error, "metrics server exited with an error");
    }

    Ok(())
}
