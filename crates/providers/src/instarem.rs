//! A provider adapter that reports delivery time as free text ("within 24
//! hours") rather than a minute count, exercising the §6 closed
//! free-text → minutes table (applied by the normalizer, not here — the
//! adapter only has to pass the phrase through unchanged).

use async_trait::async_trait;
use provider_core::{AdapterContext, Deadline, DeliveryTime, Outcome, ProviderAdapter, RawError, RawResult};
use quote_model::{DeliveryMethod, ErrorKind, PaymentMethod, QuoteRequest};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;
use url::Url;

use crate::http::AdapterHttp;

pub const PROVIDER_ID: &str = "instarem";

pub struct InstaremAdapter {
    context: Arc<AdapterContext>,
    base_url: Url,
}

impl InstaremAdapter {
    pub fn new(context: Arc<AdapterContext>, base_url: Url) -> Self {
        Self { context, base_url }
    }
}

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    #[serde(default)]
    fee: Option<Decimal>,
    rate: Decimal,
    eta: String,
    #[serde(default)]
    payment_method: Option<String>,
    #[serde(default)]
    delivery_method: Option<String>,
}

#[async_trait]
impl ProviderAdapter for InstaremAdapter {
    fn id(&self) -> &str {
        PROVIDER_ID
    }

    fn display_name(&self) -> &str {
        "InstaRem"
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
                "/gateway/v1/quote",
                &[
                    ("srcCurrency", request.source_currency.as_str()),
                    ("destCurrency", dest_currency.as_str()),
                    ("srcAmount", amount.as_str()),
                ],
                deadline,
            )
            .await;

        let response = match response {
            Ok(r) => r,
            Err(error) => return failure(request, &dest_currency, error),
        };

        let destination_amount = request.amount * response.rate;
        RawResult {
            provider_id: PROVIDER_ID.to_string(),
            send_amount: request.amount,
            source_currency: request.source_currency.clone(),
            destination_currency: dest_currency,
            outcome: Outcome::Success {
                destination_amount,
                exchange_rate: Some(response.rate),
                fee: response.fee,
                payment_method: parse_payment_method(response.payment_method.as_deref()),
                delivery_method: parse_delivery_method(response.delivery_method.as_deref()),
                delivery_time: DeliveryTime::FreeText(response.eta),
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
        Some("open_banking") => PaymentMethod::OpenBanking,
        _ => PaymentMethod::Unknown,
    }
}

fn parse_delivery_method(raw: Option<&str>) -> DeliveryMethod {
    match raw {
        Some("bank_deposit") => DeliveryMethod::BankDeposit,
        Some("mobile_wallet") => DeliveryMethod::MobileWallet,
        _ => DeliveryMethod::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use normalizer::Normalizer;
    use rust_decimal_macros::dec;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn request() -> QuoteRequest {
        QuoteRequest {
            source_country: "US".into(),
            dest_country: "PH".into(),
            source_currency: "USD".into(),
            dest_currency: Some("PHP".into()),
            amount: dec!(1000),
            payment_method: None,
            delivery_method: None,
            options: Default::default(),
        }
    }

    fn adapter(base_url: Url) -> InstaremAdapter {
        let context = Arc::new(AdapterContext::new(catalog::Catalog::new(), std::time::Duration::from_secs(5)));
        InstaremAdapter::new(context, base_url)
    }

    #[tokio::test]
    async fn free_text_delivery_time_resolves_via_the_normalizer_table() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gateway/v1/quote"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "fee": "0",
                "rate": "55.80",
                "eta": "within 24 hours",
                "payment_method": "bank_account",
                "delivery_method": "bank_deposit",
            })))
            .mount(&server)
            .await;

        let adapter = adapter(server.uri().parse().unwrap());
        let raw = adapter.quote(&request(), Deadline::after(std::time::Duration::from_secs(1))).await;
        assert!(raw.is_success());
        let quote = Normalizer::new(catalog::Catalog::new()).normalize(raw);
        assert_eq!(quote.delivery_time_minutes, Some(1440));
    }

    #[tokio::test]
    async fn missing_fee_becomes_a_parsing_failure_after_normalization() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gateway/v1/quote"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "rate": "55.80",
                "eta": "instant",
            })))
            .mount(&server)
            .await;

        let adapter = adapter(server.uri().parse().unwrap());
        let raw = adapter.quote(&request(), Deadline::after(std::time::Duration::from_secs(1))).await;
        let quote = Normalizer::new(catalog::Catalog::new()).normalize(raw);
        assert!(!quote.success);
        assert_eq!(quote.error_kind, Some(ErrorKind::Parsing));
    }
}
