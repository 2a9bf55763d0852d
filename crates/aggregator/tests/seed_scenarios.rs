//! Coordinator-level integration tests for the end-to-end seed scenarios
//! (spec §8) not already exercised by `coordinator.rs`'s unit tests: a
//! per-adapter timeout and tiered-rate selection. Uses `MockProviderAdapter`
//! registries so no network access is required.

use std::{sync::Arc, time::Duration};

use aggregator::{Coordinator, CoordinatorConfig};
use async_trait::async_trait;
use cache::{InMemoryCache, TtlPolicy};
use catalog::Catalog;
use normalizer::Normalizer;
use provider_core::{Deadline, DeliveryTime, Outcome, ProviderAdapter, RawResult};
use quote_model::{DeliveryMethod, ErrorKind, PaymentMethod, QuoteRequest, QuoteRequestOptions};
use registry::Registry;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn request() -> QuoteRequest {
    QuoteRequest {
        source_country: "US".into(),
        dest_country: "MX".into(),
        source_currency: "USD".into(),
        dest_currency: Some("MXN".into()),
        amount: dec!(500),
        payment_method: None,
        delivery_method: None,
        options: QuoteRequestOptions::default(),
    }
}

fn coordinator(registry: Registry, per_provider_timeout: Duration) -> Coordinator {
    Coordinator::new(
        Catalog::new(),
        Arc::new(registry),
        Normalizer::new(Catalog::new()),
        Arc::new(InMemoryCache::new(TtlPolicy::default())),
        CoordinatorConfig {
            per_provider_timeout,
            max_workers: None,
            max_request_amount: dec!(1_000_000),
            single_flight_wait_timeout: Duration::from_millis(500),
        },
    )
}

/// An adapter that never returns inside the per-provider deadline.
struct SlowAdapter;

#[async_trait]
impl ProviderAdapter for SlowAdapter {
    fn id(&self) -> &str {
        "slow"
    }
    fn display_name(&self) -> &str {
        "Slow"
    }
    async fn quote(&self, _request: &QuoteRequest, _deadline: Deadline) -> RawResult {
        tokio::time::sleep(Duration::from_secs(10)).await;
        unreachable!("executor must have already timed this adapter out");
    }
}

/// An adapter exposing amount-banded tiers, selecting the tier whose
/// `[min, max]` band contains the requested amount (spec §4.B rule 5).
struct TieredAdapter {
    tiers: Vec<(Decimal, Decimal, Decimal)>,
}

#[async_trait]
impl ProviderAdapter for TieredAdapter {
    fn id(&self) -> &str {
        "tiered"
    }
    fn display_name(&self) -> &str {
        "Tiered"
    }
    async fn quote(&self, request: &QuoteRequest, _deadline: Deadline) -> RawResult {
        let rate = self
            .tiers
            .iter()
            .find(|(min, max, _)| request.amount >= *min && request.amount <= *max)
            .map(|(_, _, rate)| *rate)
            .expect("request amount falls inside one of the configured tiers");

        RawResult {
            provider_id: self.id().to_string(),
            send_amount: request.amount,
            source_currency: request.source_currency.clone(),
            destination_currency: request.dest_currency.clone().unwrap_or_default(),
            outcome: Outcome::Success {
                destination_amount: request.amount * rate,
                exchange_rate: Some(rate),
                fee: Some(dec!(0)),
                payment_method: PaymentMethod::BankAccount,
                delivery_method: DeliveryMethod::BankDeposit,
                delivery_time: DeliveryTime::Minutes(60),
            },
            raw_payload: None,
        }
    }
}

#[tokio::test]
async fn per_adapter_timeout_is_recorded_and_the_call_stays_bounded() {
    let mut registry = Registry::new();
    registry.register("slow", "Slow", || Arc::new(SlowAdapter));

    let coordinator = coordinator(registry, Duration::from_millis(500));
    let start = std::time::Instant::now();
    let result = coordinator.get_all_quotes(request()).await;

    assert!(start.elapsed() < Duration::from_millis(1500));
    assert!(result.success);
    assert!(result.quotes.is_empty());
    assert_eq!(result.errors["slow"].error_kind, ErrorKind::Timeout);
}

#[tokio::test]
async fn tiered_rate_selection_picks_the_band_containing_the_amount() {
    let mut registry = Registry::new();
    registry.register("tiered", "Tiered", || {
        Arc::new(TieredAdapter {
            tiers: vec![(dec!(0), dec!(499), dec!(55.5)), (dec!(500), dec!(10000), dec!(56.22))],
        })
    });

    let coordinator = coordinator(registry, Duration::from_millis(500));
    let result = coordinator.get_all_quotes(request()).await;

    assert_eq!(result.quotes.len(), 1);
    assert_eq!(result.quotes[0].exchange_rate, Some(dec!(56.22)));
}
