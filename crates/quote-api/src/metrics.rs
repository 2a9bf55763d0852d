//! Ambient process metrics (spec §6 non-goals exclude *business* metrics
//! design, not the presence of a `/metrics` endpoint). Grounded on the
//! teacher's `global_metrics::get_metric_storage_registry` + `prometheus`
//! pairing (`crates/autopilot/src/lib.rs`); `prometheus-metric-storage`'s
//! macro-generated registries weren't retrieved for this corpus, so the
//! registry here is built directly against `prometheus::Registry`.

use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

pub struct ApiMetrics {
    registry: Registry,
    requests: IntCounterVec,
}

impl ApiMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();
        let requests = IntCounterVec::new(
            Opts::new("quote_api_requests_total", "HTTP requests served by route and status"),
            &["route", "status"],
        )
        .expect("static metric descriptor is valid");
        registry
            .register(Box::new(requests.clone()))
            .expect("metric only registered once");
        Self { registry, requests }
    }

    pub fn record(&self, route: &str, status: u16) {
        self.requests.with_label_values(&[route, &status.to_string()]).inc();
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        let families = self.registry.gather();
        encoder
            .encode(&families, &mut buffer)
            .expect("text encoding of gathered metric families never fails");
        buffer
    }
}

impl Default for ApiMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_and_renders_a_counter() {
        let metrics = ApiMetrics::new();
        metrics.record("quotes", 200);
        let rendered = String::from_utf8(metrics.encode()).unwrap();
        assert!(rendered.contains("quote_api_requests_total"));
    }
}
