//! A tiered-rate provider adapter (spec §4.B rule 5): the rate and fee
//! returned depend on which `[min, max]` amount band the request falls
//! into, exercising tiered-rate selection end to end.

use async_trait::async_trait;
use provider_core::{AdapterContext, Deadline, DeliveryTime, Outcome, ProviderAdapter, RawError, RawResult};
use quote_model::{DeliveryMethod, ErrorKind, PaymentMethod, QuoteRequest};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;
use url::Url;

use crate::http::AdapterHttp;

pub const PROVIDER_ID: &str = "wise";

pub struct WiseAdapter {
    context: Arc<AdapterContext>,
    base_url: Url,
}

impl WiseAdapter {
    pub fn new(context: Arc<AdapterContext>, base_url: Url) -> Self {
        Self { context, base_url }
    }
}

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    tiers: Vec<Tier>,
    #[serde(default)]
    payment_method: Option<String>,
    #[serde(default)]
    delivery_method: Option<String>,
    #[serde(default)]
    delivery_time_minutes: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Tier {
    min: Decimal,
    max: Decimal,
    rate: Decimal,
    fee: Decimal,
}

/// Selects the tier whose `[min, max]` band contains `amount`; ties broken
/// by preferring the lower `min` (spec §4.B rule 5).
fn select_tier(tiers: &[Tier], amount: Decimal) -> Option<&Tier> {
    tiers
        .iter()
        .filter(|t| amount >= t.min && amount <= t.max)
        .min_by_key(|t| t.min)
}

#[async_trait]
impl ProviderAdapter for WiseAdapter {
    fn id(&self) -> &str {
        PROVIDER_ID
    }

    fn display_name(&self) -> &str {
        "Wise"
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
                "/v3/quotes",
                &[
                    ("sourceCurrency", request.source_currency.as_str()),
                    ("targetCurrency", dest_currency.as_str()),
                    ("sourceAmount", amount.as_str()),
                ],
                deadline,
            )
            .await;

        let response = match response {
            Ok(r) => r,
            Err(error) => return failure(request, &dest_currency, error),
        };

        let Some(tier) = select_tier(&response.tiers, request.amount) else {
            return failure(
                request,
                &dest_currency,
                RawError::new(ErrorKind::UnsupportedCorridor, "no tier covers the requested amount"),
            );
        };

        let destination_amount = request.amount * tier.rate;
        RawResult {
            provider_id: PROVIDER_ID.to_string(),
            send_amount: request.amount,
            source_currency: request.source_currency.clone(),
            destination_currency: dest_currency,
            outcome: Outcome::Success {
                destination_amount,
                exchange_rate: Some(tier.rate),
                fee: Some(tier.fee),
                payment_method: parse_payment_method(response.payment_method.as_deref()),
                delivery_method: parse_delivery_method(response.delivery_method.as_deref()),
                delivery_time: response
                    .delivery_time_minutes
                    .map(DeliveryTime::Minutes)
                    .unwrap_or(DeliveryTime::Unknown),
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

fn parse_payment_method(raw: Option<&str>) -> PaymentMethod {
    match raw {
        Some("bank_account") => PaymentMethod::BankAccount,
        Some("debit_card") => PaymentMethod::DebitCard,
        Some("credit_card") => PaymentMethod::CreditCard,
        _ => PaymentMethod::Unknown,
    }
}

fn parse_delivery_method(raw: Option<&str>) -> DeliveryMethod {
    match raw {
        Some("bank_deposit") => DeliveryMethod::BankDeposit,
        Some("cash_pickup") => DeliveryMethod::CashPickup,
        Some("mobile_wallet") => DeliveryMethod::MobileWallet,
        _ => DeliveryMethod::Unknown,
    }
}
