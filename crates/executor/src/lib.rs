//! Fan-out Executor (spec §4.E): parallel dispatch over adapters with a
//! bounded worker pool, a per-call deadline, cancellation, and
//! panic-isolation. Grounded directly on
//! `autopilot::run_loop::RunLoop::solve` — `tokio::time::timeout` wrapping
//! each call, `futures::future::join_all` over an enumerated future list so
//! result order tracks input order rather than completion order, failures
//! turned into values instead of aborting the batch.

use std::{sync::Arc, time::Duration};

use futures::future::join_all;
use provider_core::{Deadline, ProviderAdapter, RawError, RawResult};
use quote_model::{ErrorKind, QuoteRequest};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Bound placed on `max_workers` (spec §4.E): "capped at 32".
pub const MAX_WORKER_CAP: usize = 32;

/// The 2-second drain bound after a cancellation signal (spec §4.E / §5).
pub const DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Clone, Copy, Debug)]
pub struct ExecutorConfig {
    pub per_provider_timeout: Duration,
    pub max_workers: usize,
}

impl ExecutorConfig {
    pub fn new(
        per_provider_timeout: Duration,
        requested_workers: Option<usize>,
        active_count: usize,
    ) -> Self {
        let max_workers = requested_workers
            .unwrap_or(active_count.max(1))
            .clamp(1, MAX_WORKER_CAP);
        Self {
            per_provider_timeout,
            max_workers,
        }
    }
}

fn abandoned(adapter: &Arc<dyn ProviderAdapter>, request: &QuoteRequest, message: &str) -> RawResult {
    RawResult::failure(
        adapter.id(),
        request.amount,
        request.source_currency.clone(),
        request
            .dest_currency
            .clone()
            .unwrap_or_else(|| request.source_currency.clone()),
        RawError::new(ErrorKind::Internal, message.to_string()),
    )
}

/// Fans out `request` to every adapter in `adapters`, preserving input
/// order in the returned `Vec` (spec §4.E: "ordered by the registry's
/// active-id order, independent of completion order").
///
/// If `cancellation` fires before all adapters finish, in-flight adapter
/// tasks are aborted at their next await point; the function returns once
/// every task has either finished or been aborted, bounded by
/// [`DRAIN_TIMEOUT`].
pub async fn fan_out(
    adapters: &[Arc<dyn ProviderAdapter>],
    request: &QuoteRequest,
    config: ExecutorConfig,
    cancellation: CancellationToken,
) -> Vec<RawResult> {
    let semaphore = Arc::new(Semaphore::new(config.max_workers));
    let deadline = Deadline::after(config.per_provider_timeout);

    let tasks: Vec<_> = adapters
        .iter()
        .map(|adapter| {
            let adapter = adapter.clone();
            let semaphore = semaphore.clone();
            let cancellation = cancellation.clone();
            let request = request.clone();
            let provider_id = adapter.id().to_string();
            let span = tracing::info_span!("fan_out_adapter", provider_id = %provider_id);
            tokio::spawn(
                async move {
                    let _permit = semaphore.acquire_owned().await.expect("semaphore not closed");
                    run_one(
                        adapter,
                        &request,
                        deadline,
                        config.per_provider_timeout,
                        cancellation,
                    )
                    .await
                }
                .instrument(span),
            )
        })
        .collect();

    let drain_bound = DRAIN_TIMEOUT + config.per_provider_timeout;
    let results = match tokio::time::timeout(drain_bound, join_all(tasks)).await {
        Ok(results) => results,
        Err(_) => {
            tracing::warn!("fan-out drain timeout exceeded, abandoning remaining workers");
            return adapters
                .iter()
                .map(|adapter| abandoned(adapter, request, "worker abandoned after drain timeout"))
                .collect();
        }
    };

    results
        .into_iter()
        .zip(adapters.iter())
        .map(|(joined, adapter)| match joined {
            Ok(raw) => raw,
            Err(join_error) => {
                let message = if join_error.is_cancelled() {
                    "worker task cancelled".to_string()
                } else {
                    format!("worker task panicked: {join_error}")
                };
                tracing::error!(provider_id = adapter.id(), %message, "adapter task fault");
                abandoned(adapter, request, &message)
            }
        })
        .collect()
}

async fn run_one(
    adapter: Arc<dyn ProviderAdapter>,
    request: &QuoteRequest,
    deadline: Deadline,
    timeout: Duration,
    cancellation: CancellationToken,
) -> RawResult {
    tokio::select! {
        biased;
        _ = cancellation.cancelled() => abandoned(&adapter, request, "cancelled"),
        outcome = tokio::time::timeout(timeout, adapter.quote(request, deadline)) => {
            match outcome {
                Ok(raw) => raw,
                Err(_) => RawResult::failure(
                    adapter.id(),
                    request.amount,
                    request.source_currency.clone(),
                    request
                        .dest_currency
                        .clone()
                        .unwrap_or_else(|| request.source_currency.clone()),
                    RawError::new(ErrorKind::Timeout, "adapter exceeded per-provider deadline"),
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use provider_core::{DeliveryTime, Outcome};
    use quote_model::{DeliveryMethod, PaymentMethod, QuoteRequestOptions};
    use rust_decimal_macros::dec;
    use std::time::Duration as StdDuration;

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

    /// A test double that sleeps for a fixed duration before returning a
    /// canned result, used to exercise ordering and timeout behavior
    /// without depending on mockall's async-trait return-value semantics.
    struct StubAdapter {
        id: &'static str,
        sleep_for: StdDuration,
        result: RawResult,
    }

    #[async_trait]
    impl ProviderAdapter for StubAdapter {
        fn id(&self) -> &str {
            self.id
        }

        fn display_name(&self) -> &str {
            self.id
        }

        async fn quote(&self, _request: &QuoteRequest, _deadline: Deadline) -> RawResult {
            tokio::time::sleep(self.sleep_for).await;
            self.result.clone()
        }
    }

    fn stub(id: &'static str, sleep_for: StdDuration, result: RawResult) -> Arc<dyn ProviderAdapter> {
        Arc::new(StubAdapter { id, sleep_for, result })
    }

    fn unreached(id: &'static str) -> RawResult {
        RawResult::failure(id, dec!(1000), "USD", "MXN", RawError::new(ErrorKind::Internal, "unreached"))
    }

    fn successful(id: &'static str) -> RawResult {
        RawResult {
            provider_id: id.into(),
            send_amount: dec!(1000),
            source_currency: "USD".into(),
            destination_currency: "MXN".into(),
            outcome: Outcome::Success {
                destination_amount: dec!(17940),
                exchange_rate: Some(dec!(17.94)),
                fee: Some(dec!(8.42)),
                payment_method: PaymentMethod::BankAccount,
                delivery_method: DeliveryMethod::BankDeposit,
                delivery_time: DeliveryTime::Minutes(1440),
            },
            raw_payload: None,
        }
    }

    #[tokio::test]
    async fn preserves_input_order_independent_of_completion_order() {
        let fast_first = stub("fast", StdDuration::from_millis(50), unreached("fast"));
        let slow_second = stub("slow", StdDuration::from_millis(5), unreached("slow"));
        let adapters = vec![fast_first, slow_second];
        let config = ExecutorConfig::new(StdDuration::from_millis(500), None, adapters.len());
        let results = fan_out(&adapters, &request(), config, CancellationToken::new()).await;
        assert_eq!(results[0].provider_id, "fast");
        assert_eq!(results[1].provider_id, "slow");
    }

    #[tokio::test]
    async fn timeout_becomes_timeout_error_kind() {
        let adapter = stub("p1", StdDuration::from_secs(10), unreached("p1"));
        let adapters = vec![adapter];
        let config = ExecutorConfig::new(StdDuration::from_millis(20), None, 1);
        let results = fan_out(&adapters, &request(), config, CancellationToken::new()).await;
        match &results[0].outcome {
            Outcome::Failure(err) => assert_eq!(err.kind, ErrorKind::Timeout),
            _ => panic!("expected timeout failure"),
        }
    }

    #[tokio::test]
    async fn partial_failure_does_not_abort_the_batch() {
        let ok = stub("p1", StdDuration::ZERO, successful("p1"));
        let failing = stub(
            "p2",
            StdDuration::ZERO,
            RawResult::failure("p2", dec!(1000), "USD", "MXN", RawError::new(ErrorKind::UnsupportedCorridor, "no")),
        );
        let adapters = vec![ok, failing];
        let config = ExecutorConfig::new(StdDuration::from_millis(500), None, 2);
        let results = fan_out(&adapters, &request(), config, CancellationToken::new()).await;
        assert!(results[0].is_success());
        assert!(!results[1].is_success());
    }

    #[tokio::test]
    async fn cancellation_marks_in_flight_adapters_internal() {
        let slow = stub("p1", StdDuration::from_secs(10), unreached("p1"));
        let adapters = vec![slow];
        let config = ExecutorConfig::new(StdDuration::from_secs(30), None, 1);
        let cancellation = CancellationToken::new();
        cancellation.cancel();
        let results = fan_out(&adapters, &request(), config, cancellation).await;
        match &results[0].outcome {
            Outcome::Failure(err) => assert_eq!(err.kind, ErrorKind::Internal),
            _ => panic!("expected a cancellation marker"),
        }
    }
}
