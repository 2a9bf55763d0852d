use std::{collections::HashSet, fmt, sync::Arc};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{quote::Quote, tokens::DeliveryMethod, tokens::PaymentMethod};

/// `sort_by` token (spec §3/§6).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    BestRate,
    LowestFee,
    FastestTime,
    BestValue,
}

/// Arbitrary caller-supplied keep/drop predicate (spec §3 `custom_predicate`,
/// deliberately left "opaque" by the specification). Not serializable: a
/// request built from an HTTP query string never carries one, it can only be
/// attached programmatically.
#[derive(Clone)]
pub struct CustomPredicate(pub Arc<dyn Fn(&Quote) -> bool + Send + Sync>);

impl fmt::Debug for CustomPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomPredicate(..)")
    }
}

impl PartialEq for CustomPredicate {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// The recognized `options` bag of spec §3.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QuoteRequestOptions {
    pub force_refresh: bool,
    pub sort_by: SortBy,
    pub max_fee: Option<Decimal>,
    pub max_delivery_time_minutes: Option<i64>,
    pub include_providers: Option<HashSet<String>>,
    pub exclude_providers: Option<HashSet<String>>,
    pub custom_predicate: Option<CustomPredicate>,
    pub per_provider_timeout_ms: Option<u64>,
    pub max_workers: Option<usize>,
    pub include_raw: bool,
}

/// A corridor + amount quote request (spec §3).
#[derive(Clone, Debug, PartialEq)]
pub struct QuoteRequest {
    pub source_country: String,
    pub dest_country: String,
    pub source_currency: String,
    pub dest_currency: Option<String>,
    pub amount: Decimal,
    pub payment_method: Option<PaymentMethod>,
    pub delivery_method: Option<DeliveryMethod>,
    pub options: QuoteRequestOptions,
}

impl QuoteRequest {
    /// The amount in integer micro-units (amount * 10^6), used for the
    /// cache key (spec §4.G) so that `1000` and `1000.00` map to the same
    /// key regardless of how the caller formatted the decimal.
    pub fn amount_micros(&self) -> i128 {
        let scaled = (self.amount * Decimal::from(1_000_000)).round();
        let unscaled = scaled.mantissa();
        // `mantissa()` is the unscaled integer; re-scale it down to the
        // rounded value's own scale (always 0 after `.round()`).
        unscaled / 10i128.pow(scaled.scale())
    }
}
