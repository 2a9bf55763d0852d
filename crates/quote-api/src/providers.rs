//! `GET /api/providers` and `GET /api/providers/{id}` (spec §6): a read-only
//! view over the registry for callers building a provider picker UI.

use axum::{
    extract::{Path, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

use crate::state::ApiState;

#[derive(Serialize)]
pub struct ProviderSummary {
    id: String,
    display_name: String,
    enabled: bool,
}

#[derive(Serialize)]
pub struct ProviderDetail {
    id: String,
    display_name: String,
    enabled: bool,
    supported_corridors: Option<Vec<(String, String)>>,
}

pub async fn list_providers(AxumState(state): AxumState<ApiState>) -> Response {
    let summaries: Vec<ProviderSummary> = state
        .registry
        .list_ids()
        .into_iter()
        .map(|id| {
            let enabled = state.registry.is_enabled(&id);
            let display_name = state.registry.display_name(&id).unwrap_or_else(|| id.clone());
            ProviderSummary { id, display_name, enabled }
        })
        .collect();
    state.metrics.record("providers_list", StatusCode::OK.as_u16());
    Json(summaries).into_response()
}

pub async fn get_provider(AxumState(state): AxumState<ApiState>, Path(id): Path<String>) -> Response {
    let Some(display_name) = state.registry.display_name(&id) else {
        state.metrics.record("providers_detail", StatusCode::NOT_FOUND.as_u16());
        return (StatusCode::NOT_FOUND, format!("unknown provider {id}")).into_response();
    };

    let supported_corridors = match state.registry.build(&id) {
        Ok(adapter) => adapter.supported_corridors(),
        Err(_) => None,
    };

    state.metrics.record("providers_detail", StatusCode::OK.as_u16());
    Json(ProviderDetail {
        enabled: state.registry.is_enabled(&id),
        id,
        display_name,
        supported_corridors,
    })
    .into_response()
}
