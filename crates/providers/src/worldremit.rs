//! A provider adapter with a static corridor allow-list (spec §4.B:
//! `supported_corridors()` lets the fan-out short-circuit without a network
//! call) and comma-formatted decimal strings in its payload, exercising
//! locale-neutral decimal parsing (spec §4.B rule 4).

use async_trait::async_trait;
use provider_core::{AdapterContext, Deadline, DeliveryTime, Outcome, ProviderAdapter, RawError, RawResult};
use quote_model::{DeliveryMethod, ErrorKind, PaymentMethod, QuoteRequest};
use serde::Deserialize;
use std::sync::Arc;
use url::Url;

use crate::http::{parse_locale_decimal, AdapterHttp};

pub const PROVIDER_ID: &str = "worldremit";

/// Corridors this adapter serves (spec §4.B: a provider may declare its
/// corridors statically instead of detecting unsupported ones inline).
const SUPPORTED_CORRIDORS: &[(&str, &str)] =
    &[("US", "PH"), ("US", "NG"), ("GB", "NG"), ("GB", "IN"), ("CA", "PH")];

pub struct WorldRemitAdapter {
    context: Arc<AdapterContext>,
    base_url: Url,
}

impl WorldRemitAdapter {
    pub fn new(context: Arc<AdapterContext>, base_url: Url) -> Self {
        Self { context, base_url }
    }
}

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    /// Comma-thousands-formatted decimal string, e.g. `"3,500.00"`.
    fee: String,
    rate: String,
    #[serde(default)]
    payment_method: Option<String>,
    #[serde(default)]
    delivery_method: Option<String>,
    #[serde(default)]
    delivery_time_minutes: Option<i64>,
}

#[async_trait]
impl ProviderAdapter for WorldRemitAdapter {
    fn id(&self) -> &str {
        PROVIDER_ID
    }

    fn display_name(&self) -> &str {
        "WorldRemit"
    }

    fn supported_corridors(&self) -> Option<Vec<(String, String)>> {
        Some(
            SUPPORTED_CORRIDORS
                .iter()
                .map(|(s, d)| (s.to_string(), d.to_string()))
                .collect(),
        )
    }

    async fn quote(&self, request: &QuoteRequest, deadline: Deadline) -> RawResult {
        let dest_currency = match resolve_dest_currency(&self.context, request) {
            Ok(c) => c,
            Err(raw) => return raw,
        };

        let supported = SUPPORTED_CORRIDORS
            .iter()
            .any(|(s, d)| *s == request.source_country && *d == request.dest_country);
        if !supported {
            return failure(
                request,
                &dest_currency,
                RawError::new(ErrorKind::UnsupportedCorridor, "corridor not in WorldRemit's allow-list"),
            );
        }

        let http = AdapterHttp::new(self.context.http(), &self.base_url, PROVIDER_ID);
        let amount = request.amount.to_string();
        let response: Result<QuoteResponse, RawError> = http
            .get_json(
                "/rates",
                &[
                    ("send", amount.as_str()),
                    ("from", request.source_currency.as_str()),
                    ("to", dest_currency.as_str()),
                ],
                deadline,
            )
            .await;

        let response = match response {
            Ok(r) => r,
            Err(error) => return failure(request, &dest_currency, error),
        };

        let rate = match parse_locale_decimal(&response.rate) {
            Ok(r) => r,
            Err(error) => return failure(request, &dest_currency, error),
        };
        let fee = match parse_locale_decimal(&response.fee) {
            Ok(f) => f,
            Err(error) => return failure(request, &dest_currency, error),
        };

        let destination_amount = request.amount * rate;
        RawResult {
            provider_id: PROVIDER_ID.to_string(),
            send_amount: request.amount,
            source_currency: request.source_currency.clone(),
            destination_currency: dest_currency,
            outcome: Outcome::Success {
                destination_amount,
                exchange_rate: Some(rate),
                fee: Some(fee),
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
        Some("debit_card") => PaymentMethod::DebitCard,
        Some("credit_card") => PaymentMethod::CreditCard,
        Some("bank_account") => PaymentMethod::BankAccount,
        _ => PaymentMethod::Unknown,
    }
}

fn parse_delivery_method(raw: Option<&str>) -> DeliveryMethod {
    match raw {
        Some("cash_pickup") => DeliveryMethod::CashPickup,
        Some("bank_deposit") => DeliveryMethod::BankDeposit,
        Some("mobile_wallet") => DeliveryMethod::MobileWallet,
        _ => DeliveryMethod::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn request(source: &str, dest: &str) -> QuoteRequest {
        QuoteRequest {
            source_country: source.into(),
            dest_country: dest.into(),
            source_currency: "USD".into(),
            dest_currency: Some("PHP".into()),
            amount: dec!(1000),
            payment_method: None,
            delivery_method: None,
            options: Default::default(),
        }
    }

    fn adapter(base_url: Url) -> WorldRemitAdapter {
        let context = Arc::new(AdapterContext::new(catalog::Catalog::new(), std::time::Duration::from_secs(5)));
        WorldRemitAdapter::new(context, base_url)
    }

    #[tokio::test]
    async fn parses_comma_formatted_decimals() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rates"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "fee": "3,500.00",
                "rate": "55.80",
            })))
            .mount(&server)
            .await;

        let adapter = adapter(server.uri().parse().unwrap());
        let raw = adapter
            .quote(&request("US", "PH"), Deadline::after(std::time::Duration::from_secs(1)))
            .await;
        match raw.outcome {
            Outcome::Success { fee, .. } => assert_eq!(fee, Some(dec!(3500.00))),
            Outcome::Failure(e) => panic!("unexpected failure: {e:?}"),
        }
    }

    #[tokio::test]
    async fn corridor_outside_the_allow_list_is_unsupported_without_a_network_call() {
        let server = MockServer::start().await;
        // deliberately mounts no handler for /rates: a network call would panic wiremock.
        let adapter = adapter(server.uri().parse().unwrap());
        let raw = adapter
            .quote(&request("FR", "JP"), Deadline::after(std::time::Duration::from_secs(1)))
            .await;
        match raw.outcome {
            Outcome::Failure(e) => assert_eq!(e.kind, ErrorKind::UnsupportedCorridor),
            Outcome::Success { .. } => panic!("expected unsupported corridor"),
        }
    }
}
