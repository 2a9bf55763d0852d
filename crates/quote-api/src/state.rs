use std::sync::Arc;

use aggregator::Coordinator;
use catalog::Catalog;
use registry::Registry;

use crate::metrics::ApiMetrics;

/// Shared `axum` handler state, cloned cheaply per request the way
/// `autopilot::infra::api::State` wraps an `Arc<dyn NativePriceEstimating>`.
#[derive(Clone)]
pub struct ApiState {
    pub coordinator: Arc<Coordinator>,
    pub registry: Arc<Registry>,
    pub catalog: Catalog,
    pub metrics: Arc<ApiMetrics>,
}
