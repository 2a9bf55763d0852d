use std::{collections::HashMap, sync::Arc, time::Duration, time::Instant};

use cache::{QuoteCache, SingleFlight};
use catalog::Catalog;
use executor::ExecutorConfig;
use normalizer::Normalizer;
use quote_model::{AggregateResult, FiltersApplied, ProviderError, Quote, QuoteRequest, RequestEcho};
use registry::Registry;
use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use crate::validate;

/// Process-wide defaults the coordinator falls back to when a request
/// doesn't override them via `QuoteRequestOptions` (spec §4.H / §6),
/// populated from `quote_config::Arguments` at composition-root time.
#[derive(Clone, Copy, Debug)]
pub struct CoordinatorConfig {
    pub per_provider_timeout: Duration,
    pub max_workers: Option<usize>,
    pub max_request_amount: Decimal,
    pub single_flight_wait_timeout: Duration,
}

/// Ties the catalog, registry, fan-out executor, normalizer, filter/sort
/// pipeline and cache into the single `get_all_quotes` entry point (spec
/// §4.H), grounded on `run_loop.rs::single_run_`'s
/// validate → probe → fan-out → normalize → respond shape.
pub struct Coordinator {
    catalog: Catalog,
    registry: Arc<Registry>,
    normalizer: Normalizer,
    cache: Arc<dyn QuoteCache>,
    single_flight: SingleFlight<Arc<AggregateResult>>,
    config: CoordinatorConfig,
}

impl Coordinator {
    pub fn new(
        catalog: Catalog,
        registry: Arc<Registry>,
        normalizer: Normalizer,
        cache: Arc<dyn QuoteCache>,
        config: CoordinatorConfig,
    ) -> Self {
        let single_flight = SingleFlight::new(config.single_flight_wait_timeout);
        Self {
            catalog,
            registry,
            normalizer,
            cache,
            single_flight,
            config,
        }
    }

    /// Entry point for the HTTP surface and for tests: never cancellable
    /// from the outside, the common case.
    pub async fn get_all_quotes(&self, request: QuoteRequest) -> Arc<AggregateResult> {
        self.get_all_quotes_cancellable(request, CancellationToken::new()).await
    }

    /// As [`Coordinator::get_all_quotes`], but lets a caller (the HTTP
    /// layer, on client disconnect) cancel the in-flight fan-out early
    /// (spec §5).
    pub async fn get_all_quotes_cancellable(
        &self,
        request: QuoteRequest,
        cancellation: CancellationToken,
    ) -> Arc<AggregateResult> {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("get_all_quotes", %request_id);
        async move {
            if let Err(message) = validate::validate(&self.catalog, &request, self.config.max_request_amount) {
                tracing::debug!(%message, "rejected invalid quote request");
                return Arc::new(AggregateResult::invalid_parameter(request_id, message));
            }

            let dest_currency = request
                .dest_currency
                .clone()
                .or_else(|| self.catalog.default_currency(&request.dest_country).ok().map(str::to_string))
                .expect("validate() already proved a destination currency is resolvable");

            let key = cache::key::quote_key(
                &request.source_country,
                &request.dest_country,
                &request.source_currency,
                &dest_currency,
                request.amount_micros(),
            );

            let start = Instant::now();

            if !request.options.force_refresh {
                if let Some(cached) = self.cache.get_quote(&key).await {
                    tracing::debug!(%key, "quote cache hit");
                    return Arc::new(AggregateResult {
                        request_id,
                        cache_hit: true,
                        timestamp: chrono::Utc::now(),
                        elapsed_ms: start.elapsed().as_millis() as u64,
                        ..(*cached).clone()
                    });
                }
            }

            let result = self
                .single_flight
                .run(&key, || {
                    let request = request.clone();
                    let dest_currency = dest_currency.clone();
                    let cancellation = cancellation.clone();
                    async move {
                        Arc::new(self.run_fan_out(request_id, request, dest_currency, start, cancellation).await)
                    }
                })
                .await;

            if is_cache_worthy(&result) {
                self.cache.put_quote(key, result.clone()).await;
            }

            result
        }
        .instrument(span)
        .await
    }

    /// The work done exactly once per cache key even under concurrent
    /// callers (spec §4.G single-flight): resolve active adapters, fan out,
    /// normalize, filter/sort, and assemble the response.
    async fn run_fan_out(
        &self,
        request_id: Uuid,
        mut request: QuoteRequest,
        dest_currency: String,
        start: Instant,
        cancellation: CancellationToken,
    ) -> AggregateResult {
        request.dest_currency = Some(dest_currency);

        let adapters = self
            .registry
            .build_active(request.options.include_providers.as_ref(), request.options.exclude_providers.as_ref());

        let per_provider_timeout = request
            .options
            .per_provider_timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(self.config.per_provider_timeout);
        let max_workers = request.options.max_workers.or(self.config.max_workers);
        let exec_config = ExecutorConfig::new(per_provider_timeout, max_workers, adapters.len());

        let raw_results = executor::fan_out(&adapters, &request, exec_config, cancellation).await;

        let mut all_providers: Vec<Quote> = raw_results
            .into_iter()
            .map(|raw| self.normalizer.normalize(raw))
            .collect();
        if !request.options.include_raw {
            for quote in &mut all_providers {
                quote.raw = None;
            }
        }

        let errors: HashMap<String, ProviderError> = all_providers
            .iter()
            .filter(|q| !q.success)
            .map(|q| {
                (
                    q.provider_id.clone(),
                    ProviderError {
                        error_kind: q.error_kind.expect("failed quote always carries an error_kind"),
                        error_message: q.error_message.clone().unwrap_or_default(),
                    },
                )
            })
            .collect();

        let quotes = filter_sort::filter_and_sort(&all_providers, &request.options);

        AggregateResult {
            request_id,
            request: Some(RequestEcho::from(&request)),
            success: true,
            elapsed_ms: start.elapsed().as_millis() as u64,
            cache_hit: false,
            timestamp: chrono::Utc::now(),
            filters_applied: FiltersApplied {
                sort_by: request.options.sort_by,
                max_fee: request.options.max_fee,
                max_delivery_time_minutes: request.options.max_delivery_time_minutes,
                had_custom_predicate: request.options.custom_predicate.is_some(),
            },
            all_providers,
            quotes,
            errors,
        }
    }
}

/// Don't poison the cache with a result shaped entirely by transient
/// failures (spec §4.G/§4.H): only write when at least one provider
/// produced a quote, or a definitive `UnsupportedCorridor` is worth
/// remembering. Timeouts, internal errors, and anything else are left
/// unwritten so the next call retries the fan-out.
fn is_cache_worthy(result: &AggregateResult) -> bool {
    if result.all_providers.is_empty() {
        return false;
    }
    !result.quotes.is_empty()
        || result
            .all_providers
            .iter()
            .any(|q| q.error_kind == Some(quote_model::ErrorKind::UnsupportedCorridor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cache::store::InMemoryCache;
    use cache::ttl::TtlPolicy;
    use provider_core::{Deadline, DeliveryTime, Outcome, ProviderAdapter, RawError, RawResult};
    use quote_model::{DeliveryMethod, ErrorKind, PaymentMethod, QuoteRequestOptions, SortBy};
    use rust_decimal_macros::dec;

    struct StubAdapter {
        id: &'static str,
        outcome: Outcome,
    }

    #[async_trait]
    impl ProviderAdapter for StubAdapter {
        fn id(&self) -> &str {
            self.id
        }
        fn display_name(&self) -> &str {
            self.id
        }
        async fn quote(&self, request: &QuoteRequest, _deadline: Deadline) -> RawResult {
            RawResult {
                provider_id: self.id.to_string(),
                send_amount: request.amount,
                source_currency: request.source_currency.clone(),
                destination_currency: request.dest_currency.clone().unwrap_or_default(),
                outcome: self.outcome.clone(),
                raw_payload: None,
            }
        }
    }

    fn success_outcome(rate: Decimal, fee: Decimal) -> Outcome {
        Outcome::Success {
            destination_amount: dec!(1000) * rate,
            exchange_rate: Some(rate),
            fee: Some(fee),
            payment_method: PaymentMethod::BankAccount,
            delivery_method: DeliveryMethod::BankDeposit,
            delivery_time: DeliveryTime::Minutes(1440),
        }
    }

    fn request() -> QuoteRequest {
        QuoteRequest {
            source_country: "US".into(),
            dest_country: "MX".into(),
            source_currency: "USD".into(),
            dest_currency: Some("MXN".into()),
            amount: dec!(1000),
            payment_method: None,
            delivery_method: None,
            options: QuoteRequestOptions::default(),
        }
    }

    fn coordinator(registry: Registry) -> Coordinator {
        Coordinator::new(
            Catalog::new(),
            Arc::new(registry),
            Normalizer::new(Catalog::new()),
            Arc::new(InMemoryCache::new(TtlPolicy::default())),
            CoordinatorConfig {
                per_provider_timeout: Duration::from_millis(500),
                max_workers: None,
                max_request_amount: dec!(1_000_000),
                single_flight_wait_timeout: Duration::from_millis(500),
            },
        )
    }

    #[tokio::test]
    async fn happy_path_sorts_by_best_rate_and_drops_failures() {
        let mut registry = Registry::new();
        registry.register("p1", "P1", || Arc::new(StubAdapter { id: "p1", outcome: success_outcome(dec!(17.94), dec!(8.42)) }));
        registry.register("p2", "P2", || Arc::new(StubAdapter { id: "p2", outcome: success_outcome(dec!(17.78), dec!(0)) }));
        registry.register("p3", "P3", || {
            Arc::new(StubAdapter {
                id: "p3",
                outcome: Outcome::Failure(RawError::new(ErrorKind::UnsupportedCorridor, "nope")),
            })
        });

        let coordinator = coordinator(registry);
        let result = coordinator.get_all_quotes(request()).await;

        assert!(result.success);
        assert!(!result.cache_hit);
        assert_eq!(result.all_providers.len(), 3);
        assert_eq!(result.quotes.len(), 2);
        assert_eq!(result.quotes[0].provider_id, "p1");
        assert_eq!(result.quotes[1].provider_id, "p2");
        assert!(result.errors.contains_key("p3"));
    }

    #[tokio::test]
    async fn max_fee_filter_is_applied_after_fan_out() {
        let mut registry = Registry::new();
        registry.register("p1", "P1", || Arc::new(StubAdapter { id: "p1", outcome: success_outcome(dec!(103.99), dec!(0)) }));
        registry.register("p2", "P2", || Arc::new(StubAdapter { id: "p2", outcome: success_outcome(dec!(104.10), dec!(2)) }));

        let coordinator = coordinator(registry);
        let mut req = request();
        req.options.max_fee = Some(dec!(0));
        let result = coordinator.get_all_quotes(req).await;

        assert_eq!(result.quotes.len(), 1);
        assert_eq!(result.quotes[0].provider_id, "p1");
    }

    #[tokio::test]
    async fn second_call_is_served_from_cache() {
        let mut registry = Registry::new();
        registry.register("p1", "P1", || Arc::new(StubAdapter { id: "p1", outcome: success_outcome(dec!(17.94), dec!(8.42)) }));

        let coordinator = coordinator(registry);
        let first = coordinator.get_all_quotes(request()).await;
        assert!(!first.cache_hit);
        let second = coordinator.get_all_quotes(request()).await;
        assert!(second.cache_hit);
        assert_eq!(second.quotes, first.quotes);
    }

    #[tokio::test]
    async fn force_refresh_bypasses_the_cache() {
        let mut registry = Registry::new();
        registry.register("p1", "P1", || Arc::new(StubAdapter { id: "p1", outcome: success_outcome(dec!(17.94), dec!(8.42)) }));

        let coordinator = coordinator(registry);
        let _ = coordinator.get_all_quotes(request()).await;
        let mut req = request();
        req.options.force_refresh = true;
        let second = coordinator.get_all_quotes(req).await;
        assert!(!second.cache_hit);
    }

    #[tokio::test]
    async fn invalid_request_short_circuits_before_any_fan_out() {
        let registry = Registry::new();
        let coordinator = coordinator(registry);
        let mut req = request();
        req.source_country = "ZZ".into();
        let result = coordinator.get_all_quotes(req).await;
        assert!(!result.success);
        assert!(result.all_providers.is_empty());
        assert!(result.errors.contains_key("request"));
    }

    #[tokio::test]
    async fn transient_failures_are_not_cached() {
        let mut registry = Registry::new();
        registry.register("p1", "P1", || {
            Arc::new(StubAdapter {
                id: "p1",
                outcome: Outcome::Failure(RawError::new(ErrorKind::Timeout, "slow")),
            })
        });
        let coordinator = coordinator(registry);
        let first = coordinator.get_all_quotes(request()).await;
        assert!(!first.cache_hit);
        let second = coordinator.get_all_quotes(request()).await;
        assert!(!second.cache_hit, "a transient timeout must not poison the cache");
    }

    #[tokio::test]
    async fn best_value_sort_prefers_highest_net_destination_amount() {
        let mut registry = Registry::new();
        registry.register("cheap_rate_no_fee", "A", || {
            Arc::new(StubAdapter { id: "cheap_rate_no_fee", outcome: success_outcome(dec!(17.00), dec!(0)) })
        });
        registry.register("best_rate_high_fee", "B", || {
            Arc::new(StubAdapter { id: "best_rate_high_fee", outcome: success_outcome(dec!(18.00), dec!(100)) })
        });
        let coordinator = coordinator(registry);
        let mut req = request();
        req.options.sort_by = SortBy::BestValue;
        let result = coordinator.get_all_quotes(req).await;
        assert_eq!(result.quotes[0].provider_id, "cheap_rate_no_fee");
    }
}
