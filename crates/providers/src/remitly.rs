//! A provider adapter that returns several payment×delivery combinations
//! per corridor and marks one as its own default (spec §4.B rule 5): the
//! adapter must honor a provider-marked default when present, otherwise
//! fall back to lowest-fee, then fastest-delivery, then lexicographic
//! `(payment_method, delivery_method)` tie-breaks.

use async_trait::async_trait;
use provider_core::{AdapterContext, Deadline, DeliveryTime, Outcome, ProviderAdapter, RawError, RawResult};
use quote_model::{DeliveryMethod, ErrorKind, PaymentMethod, QuoteRequest};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::{cmp::Ordering, sync::Arc};
use url::Url;

use crate::http::AdapterHttp;

pub const PROVIDER_ID: &str = "remitly";

pub struct RemitlyAdapter {
    context: Arc<AdapterContext>,
    base_url: Url,
}

impl RemitlyAdapter {
    pub fn new(context: Arc<AdapterContext>, base_url: Url) -> Self {
        Self { context, base_url }
    }
}

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    options: Vec<QuoteOption>,
}

#[derive(Debug, Deserialize)]
struct QuoteOption {
    payment_method: String,
    delivery_method: String,
    fee: Decimal,
    exchange_rate: Decimal,
    estimated_delivery_minutes: i64,
    #[serde(default)]
    is_default: bool,
}

/// Selects the primary option out of `options` (spec §4.B rule 5).
fn select_primary(options: &[QuoteOption]) -> Option<&QuoteOption> {
    if let Some(default) = options.iter().find(|o| o.is_default) {
        return Some(default);
    }
    options.iter().min_by(|a, b| {
        a.fee
            .cmp(&b.fee)
            .then_with(|| a.estimated_delivery_minutes.cmp(&b.estimated_delivery_minutes))
            .then_with(|| {
                (&a.payment_method, &a.delivery_method).cmp(&(&b.payment_method, &b.delivery_method))
            })
    })
}

#[async_trait]
impl ProviderAdapter for RemitlyAdapter {
    fn id(&self) -> &str {
        PROVIDER_ID
    }

    fn display_name(&self) -> &str {
        "Remitly"
    }

    async fn quote(&self, request: &QuoteRequest, deadline: Deadline) -> RawResult {
        let dest_currency = match resolve_dest_currency(&self.context, request) {
            Ok(c) => c,
            Err(raw) => return raw,
        };

        let http = AdapterHttp::new(self.context.http(), &self.base_url, PROVIDER_ID);
        let amount = request.amount.to_string();
        let response: Result<QuoteResponse, RawError> = http
            .get_json(
                "/api/v2/quote",
                &[
                    ("sourceCurrency", request.source_currency.as_str()),
                    ("targetCurrency", dest_currency.as_str()),
                    ("amount", amount.as_str()),
                ],
                deadline,
            )
            .await;

        let response = match response {
            Ok(r) => r,
            Err(error) => return failure(request, &dest_currency, error),
        };

        let Some(primary) = select_primary(&response.options) else {
            return failure(
                request,
                &dest_currency,
                RawError::new(ErrorKind::UnsupportedCorridor, "no payment/delivery combination offered"),
            );
        };

        let destination_amount = request.amount * primary.exchange_rate;
        RawResult {
            provider_id: PROVIDER_ID.to_string(),
            send_amount: request.amount,
            source_currency: request.source_currency.clone(),
            destination_currency: dest_currency,
            outcome: Outcome::Success {
                destination_amount,
                exchange_rate: Some(primary.exchange_rate),
                fee: Some(primary.fee),
                payment_method: parse_payment_method(&primary.payment_method),
                delivery_method: parse_delivery_method(&primary.delivery_method),
                delivery_time: DeliveryTime::Minutes(primary.estimated_delivery_minutes),
            },
            raw_payload: None,
        }
    }
}

fn resolve_dest_currency(
    context: &AdapterContext,
    request: &QuoteRequest,
) -> Result<String, RawResult> {
    match &request.dest_currency {
        Some(currency) => Ok(currency.clone()),
        None => context
            .catalog
            .default_currency(&request.dest_country)
            .map(str::to_string)
            .map_err(|e| {
                failure(
                    request,
                    request.source_currency.as_str(),
                    RawError::new(ErrorKind::InvalidParameter, e.message),
                )
            }),
    }
}

fn failure(request: &QuoteRequest, dest_currency: &str, error: RawError) -> RawResult {
    RawResult::failure(
        PROVIDER_ID,
        request.amount,
        request.source_currency.clone(),
        dest_currency.to_string(),
        error,
    )
}

fn parse_payment_method(raw: &str) -> PaymentMethod {
    match raw {
        "bank_account" => PaymentMethod::BankAccount,
        "debit_card" => PaymentMethod::DebitCard,
        "credit_card" => PaymentMethod::CreditCard,
        "balance" => PaymentMethod::Balance,
        _ => PaymentMethod::Unknown,
    }
}

fn parse_delivery_method(raw: &str) -> DeliveryMethod {
    match raw {
        "bank_deposit" => DeliveryMethod::BankDeposit,
        "cash_pickup" => DeliveryMethod::CashPickup,
        "mobile_wallet" => DeliveryMethod::MobileWallet,
        "debit_card_deposit" => DeliveryMethod::DebitCardDeposit,
        _ => DeliveryMethod::Unknown,
    }
}
