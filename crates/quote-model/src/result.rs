use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::ErrorKind, quote::Quote, request::QuoteRequest, request::SortBy};

/// Serializable echo of the inbound request (spec §3 "request echo"). Drops
/// the non-serializable `custom_predicate` closure; everything else that
/// shaped the response is preserved.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RequestEcho {
    pub source_country: String,
    pub dest_country: String,
    pub source_currency: String,
    pub dest_currency: Option<String>,
    pub amount: Decimal,
}

impl From<&QuoteRequest> for RequestEcho {
    fn from(request: &QuoteRequest) -> Self {
        Self {
            source_country: request.source_country.clone(),
            dest_country: request.dest_country.clone(),
            source_currency: request.source_currency.clone(),
            dest_currency: request.dest_currency.clone(),
            amount: request.amount,
        }
    }
}

/// Echo of the filters actually applied, surfaced for caller debuggability.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FiltersApplied {
    pub sort_by: SortBy,
    pub max_fee: Option<Decimal>,
    pub max_delivery_time_minutes: Option<i64>,
    pub had_custom_predicate: bool,
}

/// A failed provider's contribution to `AggregateResult.errors`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProviderError {
    pub error_kind: ErrorKind,
    pub error_message: String,
}

/// The coordinator's response object (spec §3).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AggregateResult {
    pub request_id: Uuid,
    pub request: Option<RequestEcho>,
    pub success: bool,
    pub elapsed_ms: u64,
    pub cache_hit: bool,
    pub timestamp: DateTime<Utc>,
    pub filters_applied: FiltersApplied,
    pub all_providers: Vec<Quote>,
    pub quotes: Vec<Quote>,
    pub errors: HashMap<String, ProviderError>,
}

impl AggregateResult {
    /// The single-error shape the coordinator returns for an invalid
    /// request (spec §4.H step 1): no fan-out occurred.
    pub fn invalid_parameter(request_id: Uuid, message: impl Into<String>) -> Self {
        let mut errors = HashMap::new();
        errors.insert(
            "request".to_string(),
            ProviderError {
                error_kind: ErrorKind::InvalidParameter,
                error_message: message.into(),
            },
        );
        Self {
            request_id,
            request: None,
            success: false,
            elapsed_ms: 0,
            cache_hit: false,
            timestamp: Utc::now(),
            filters_applied: FiltersApplied::default(),
            all_providers: Vec::new(),
            quotes: Vec::new(),
            errors,
        }
    }
}
