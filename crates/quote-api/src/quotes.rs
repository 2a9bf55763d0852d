//! `GET /api/quotes` (spec §6), grounded on
//! `autopilot::infra::api::get_native_price`'s
//! query-extract → call domain → `Json`/error-response shape.

use std::collections::HashSet;

use axum::{
    extract::{Query, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use quote_model::{DeliveryMethod, PaymentMethod, QuoteRequest, QuoteRequestOptions, SortBy};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::state::ApiState;

#[derive(Debug, Deserialize)]
pub struct QuotesQuery {
    source_country: String,
    dest_country: String,
    source_currency: String,
    dest_currency: Option<String>,
    amount: Decimal,
    payment_method: Option<PaymentMethod>,
    delivery_method: Option<DeliveryMethod>,
    #[serde(default)]
    sort_by: SortBy,
    max_fee: Option<Decimal>,
    max_delivery_time_minutes: Option<i64>,
    /// Comma-separated provider ids, e.g. `include_providers=wise,remitly`.
    include_providers: Option<String>,
    exclude_providers: Option<String>,
    #[serde(default)]
    force_refresh: bool,
    per_provider_timeout_ms: Option<u64>,
    max_workers: Option<usize>,
    #[serde(default)]
    include_raw: bool,
}

fn split_ids(raw: Option<String>) -> Option<HashSet<String>> {
    raw.map(|value| value.split(',').map(|id| id.trim().to_string()).filter(|id| !id.is_empty()).collect())
}

impl From<QuotesQuery> for QuoteRequest {
    fn from(query: QuotesQuery) -> Self {
        QuoteRequest {
            source_country: query.source_country,
            dest_country: query.dest_country,
            source_currency: query.source_currency,
            dest_currency: query.dest_currency,
            amount: query.amount,
            payment_method: query.payment_method,
            delivery_method: query.delivery_method,
            options: QuoteRequestOptions {
                force_refresh: query.force_refresh,
                sort_by: query.sort_by,
                max_fee: query.max_fee,
                max_delivery_time_minutes: query.max_delivery_time_minutes,
                include_providers: split_ids(query.include_providers),
                exclude_providers: split_ids(query.exclude_providers),
                custom_predicate: None,
                per_provider_timeout_ms: query.per_provider_timeout_ms,
                max_workers: query.max_workers,
                include_raw: query.include_raw,
            },
        }
    }
}

pub async fn get_quotes(AxumState(state): AxumState<ApiState>, Query(query): Query<QuotesQuery>) -> Response {
    let request: QuoteRequest = query.into();
    let result = state.coordinator.get_all_quotes(request).await;

    let status = if result.success { StatusCode::OK } else { StatusCode::BAD_REQUEST };
    state.metrics.record("quotes", status.as_u16());
    (status, Json(result.as_ref().clone())).into_response()
}
