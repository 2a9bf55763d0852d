//! `GET /healthz` and `GET /metrics` (spec §6 ambient stack), grounded on
//! `crates/autopilot/src/lib.rs`'s `Liveness`/`LivenessChecking` pairing: a
//! process that has started serving requests is considered live, the same
//! trivial check the teacher's `Liveness` struct performs.

use std::sync::Arc;

use axum::{
    extract::State as AxumState,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::metrics::ApiMetrics;

pub async fn healthz() -> Response {
    (StatusCode::OK, "ok").into_response()
}

pub async fn metrics(AxumState(metrics): AxumState<Arc<ApiMetrics>>) -> Response {
    let body = metrics.encode();
    (StatusCode::OK, [(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body).into_response()
}
