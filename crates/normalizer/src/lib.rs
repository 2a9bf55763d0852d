//! Converts a [`RawResult`] into the canonical [`Quote`] (spec §4.D):
//! rounding, rate reconciliation, delivery-time normalization, and the
//! normalization-time UTC timestamp.

pub mod delivery_time;

use catalog::Catalog;
use chrono::Utc;
use provider_core::{DeliveryTime, Outcome, RawResult};
use quote_model::{ErrorKind, Quote};
use rust_decimal::Decimal;

/// Maximum relative difference allowed between an adapter-reported
/// `exchange_rate` and the rate derived from `destination_amount /
/// send_amount` before the normalizer downgrades the quote (spec §4.D).
const RATE_TOLERANCE: Decimal = Decimal::from_parts(5, 0, 0, false, 3); // 0.005 == 0.5%

pub struct Normalizer {
    catalog: Catalog,
}

impl Normalizer {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    pub fn normalize(&self, raw: RawResult) -> Quote {
        let RawResult {
            provider_id,
            send_amount,
            source_currency,
            destination_currency,
            outcome,
            raw_payload,
        } = raw;

        let failure = |kind: ErrorKind, message: String| {
            Quote::failed(
                provider_id.clone(),
                send_amount,
                source_currency.clone(),
                destination_currency.clone(),
                kind,
                message,
            )
        };

        let Outcome::Success {
            destination_amount,
            exchange_rate,
            fee,
            payment_method,
            delivery_method,
            delivery_time,
        } = outcome
        else {
            let Outcome::Failure(error) = outcome else {
                unreachable!("Outcome has exactly two variants")
            };
            return failure(error.kind, error.message);
        };

        if destination_amount.is_sign_negative() {
            return failure(
                ErrorKind::InconsistentResponse,
                "provider reported a negative destination amount".to_string(),
            );
        }

        let Some(fee) = fee else {
            return failure(
                ErrorKind::Parsing,
                "provider did not report a fee".to_string(),
            );
        };
        if fee.is_sign_negative() {
            return failure(
                ErrorKind::Parsing,
                "provider reported a negative fee".to_string(),
            );
        }

        let derived_rate = if send_amount.is_zero() {
            Decimal::ZERO
        } else {
            destination_amount / send_amount
        };

        let rate = match exchange_rate {
            Some(reported) => {
                if !rates_agree(reported, derived_rate) {
                    return failure(
                        ErrorKind::InconsistentResponse,
                        format!(
                            "reported rate {reported} disagrees with derived rate \
                             {derived_rate} by more than {RATE_TOLERANCE}"
                        ),
                    );
                }
                reported
            }
            None => derived_rate,
        };

        if rate.is_sign_negative() || rate.is_zero() {
            return failure(
                ErrorKind::InconsistentResponse,
                "computed a non-positive exchange rate".to_string(),
            );
        }

        let amount_scale = self.catalog.decimal_places(&destination_currency);
        let fee_scale = self.catalog.decimal_places(&source_currency);

        Quote {
            provider_id,
            success: true,
            error_kind: None,
            error_message: None,
            send_amount,
            source_currency,
            destination_amount: destination_amount.round_dp(amount_scale),
            destination_currency,
            exchange_rate: Some(rate.round_dp(6)),
            fee: fee.round_dp(fee_scale),
            payment_method,
            delivery_method,
            delivery_time_minutes: normalize_delivery_time(delivery_time),
            timestamp: Utc::now(),
            raw: raw_payload,
        }
    }
}

fn rates_agree(reported: Decimal, derived: Decimal) -> bool {
    if derived.is_zero() {
        return reported.is_zero();
    }
    ((reported - derived) / derived).abs() <= RATE_TOLERANCE
}

/// Clamps to non-negative and resolves free text via the closed table
/// (spec §4.D). An unresolvable free-text phrase becomes `None`, the
/// spec's "unknown but supported" meaning, rather than a failure — the
/// provider did answer, it just used a phrase outside the table.
fn normalize_delivery_time(raw: DeliveryTime) -> Option<i64> {
    match raw {
        DeliveryTime::Minutes(m) => Some(m.max(0)),
        DeliveryTime::FreeText(text) => delivery_time::parse_free_text(&text),
        DeliveryTime::Unknown => None,
    }
}
