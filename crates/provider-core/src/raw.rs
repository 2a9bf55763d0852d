use quote_model::{DeliveryMethod, ErrorKind, PaymentMethod};
use rust_decimal::Decimal;

/// A typed adapter failure: the no-throw replacement for the exception
/// hierarchies Design Notes §9 flags in the source system.
#[derive(Clone, Debug, PartialEq)]
pub struct RawError {
    pub kind: ErrorKind,
    pub message: String,
}

impl RawError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Delivery time as reported by the provider, before the normalizer
/// collapses it to integer minutes (spec §4.D / §6).
#[derive(Clone, Debug, PartialEq)]
pub enum DeliveryTime {
    Minutes(i64),
    FreeText(String),
    Unknown,
}

/// `Quote` minus canonical-only fields (`timestamp`), as spec §4.B
/// describes it: everything the adapter itself can determine, still in the
/// adapter's own decimal representation (already converted from whatever
/// provider-native numeric scale the payload used — the adapter owns that
/// conversion, never the normalizer).
#[derive(Clone, Debug, PartialEq)]
pub struct RawResult {
    pub provider_id: String,
    pub send_amount: Decimal,
    pub source_currency: String,
    pub destination_currency: String,
    pub outcome: Outcome,
    pub raw_payload: Option<serde_json::Value>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Success {
        destination_amount: Decimal,
        /// `None` when the adapter didn't receive an explicit rate and
        /// wants the normalizer to derive one (spec §4.D).
        exchange_rate: Option<Decimal>,
        /// `None` when the provider didn't report a fee at all (see
        /// SPEC_FULL.md §9 Open Question: distinguished from an explicit
        /// zero).
        fee: Option<Decimal>,
        payment_method: PaymentMethod,
        delivery_method: DeliveryMethod,
        delivery_time: DeliveryTime,
    },
    Failure(RawError),
}

impl RawResult {
    pub fn failure(
        provider_id: impl Into<String>,
        send_amount: Decimal,
        source_currency: impl Into<String>,
        destination_currency: impl Into<String>,
        error: RawError,
    ) -> Self {
        Self {
            provider_id: provider_id.into(),
            send_amount,
            source_currency: source_currency.into(),
            destination_currency: destination_currency.into(),
            outcome: Outcome::Failure(error),
            raw_payload: None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success { .. })
    }
}
