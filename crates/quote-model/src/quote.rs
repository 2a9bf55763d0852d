use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{error::ErrorKind, tokens::DeliveryMethod, tokens::PaymentMethod};

/// The canonical per-provider result (spec §3). Constructed exclusively by
/// the normalizer; every other component treats it as read-only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub provider_id: String,
    pub success: bool,
    pub error_kind: Option<ErrorKind>,
    pub error_message: Option<String>,
    pub send_amount: Decimal,
    pub source_currency: String,
    pub destination_amount: Decimal,
    pub destination_currency: String,
    pub exchange_rate: Option<Decimal>,
    pub fee: Decimal,
    pub payment_method: PaymentMethod,
    pub delivery_method: DeliveryMethod,
    pub delivery_time_minutes: Option<i64>,
    pub timestamp: DateTime<Utc>,
    pub raw: Option<serde_json::Value>,
}

impl Quote {
    /// Builds the standard failed-quote shape (spec invariant 1): no
    /// exchange rate, zero destination amount, a typed error, and a stamped
    /// timestamp.
    pub fn failed(
        provider_id: impl Into<String>,
        send_amount: Decimal,
        source_currency: impl Into<String>,
        destination_currency: impl Into<String>,
        error_kind: ErrorKind,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            provider_id: provider_id.into(),
            success: false,
            error_kind: Some(error_kind),
            error_message: Some(error_message.into()),
            send_amount,
            source_currency: source_currency.into(),
            destination_amount: Decimal::ZERO,
            destination_currency: destination_currency.into(),
            exchange_rate: None,
            fee: Decimal::ZERO,
            payment_method: PaymentMethod::Unknown,
            delivery_method: DeliveryMethod::Unknown,
            delivery_time_minutes: None,
            timestamp: Utc::now(),
            raw: None,
        }
    }

    /// Destination amount net of the fee, expressed in destination currency
    /// terms via the Quote's own exchange rate — the `best_value` sort key
    /// (spec §4.F, Open Question resolved in SPEC_FULL.md §9).
    pub fn effective_value(&self) -> Decimal {
        let rate = self.exchange_rate.unwrap_or(Decimal::ZERO);
        self.destination_amount - self.fee * rate
    }
}
