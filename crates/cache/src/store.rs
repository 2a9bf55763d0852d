use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use moka::{future::Cache, Expiry};
use quote_model::AggregateResult;
use tokio::time::Instant;

use crate::ttl::TtlPolicy;

/// Backend-agnostic cache surface (spec §4.G), mirroring the teacher's
/// `Persistence` abstraction (`crates/autopilot/src/infra/persistence`): the
/// coordinator depends on this trait, not on any concrete backend, so a
/// future Redis/KV implementation can be swapped in without touching
/// `aggregator`.
#[async_trait]
pub trait QuoteCache: Send + Sync {
    async fn get_quote(&self, key: &str) -> Option<Arc<AggregateResult>>;
    async fn put_quote(&self, key: String, value: Arc<AggregateResult>);
    async fn get_corridor_support(&self, key: &str) -> Option<bool>;
    async fn put_corridor_support(&self, key: String, supported: bool);
    async fn get_provider_enabled(&self, key: &str) -> Option<bool>;
    async fn put_provider_enabled(&self, key: String, enabled: bool);

    async fn invalidate_all_quotes(&self);
    async fn invalidate_corridor(&self, source_country: &str, dest_country: &str);
    async fn invalidate_provider(&self, provider_id: &str);
}

trait ExpiresAt {
    fn expires_at(&self) -> Instant;
}

#[derive(Clone)]
struct QuoteEntry {
    value: Arc<AggregateResult>,
    expires_at: Instant,
}

impl ExpiresAt for QuoteEntry {
    fn expires_at(&self) -> Instant {
        self.expires_at
    }
}

#[derive(Clone, Copy)]
struct FlagEntry {
    flag: bool,
    expires_at: Instant,
}

impl ExpiresAt for FlagEntry {
    fn expires_at(&self) -> Instant {
        self.expires_at
    }
}

/// A single `moka::Expiry` implementation reused across all three
/// namespaces: every entry carries its own jittered `expires_at`, computed
/// once at insert time by [`TtlPolicy::jittered`].
struct PerEntryExpiry;

impl<K, V: ExpiresAt> Expiry<K, V> for PerEntryExpiry {
    fn expire_after_create(&self, _key: &K, value: &V, created_at: Instant) -> Option<Duration> {
        Some(value.expires_at().saturating_duration_since(created_at))
    }
}

/// In-process cache backend (spec §4.G), built on `moka` the way the
/// teacher's `price-estimation` crate declares it as a dependency for
/// exactly this kind of TTL-governed lookup cache.
pub struct InMemoryCache {
    quotes: Cache<String, QuoteEntry>,
    corridors: Cache<String, FlagEntry>,
    providers: Cache<String, FlagEntry>,
    ttl: TtlPolicy,
}

impl InMemoryCache {
    pub fn new(ttl: TtlPolicy) -> Self {
        let quotes = Cache::builder()
            .support_invalidation_closures()
            .expire_after(PerEntryExpiry)
            .build();
        let corridors = Cache::builder()
            .support_invalidation_closures()
            .expire_after(PerEntryExpiry)
            .build();
        let providers = Cache::builder()
            .support_invalidation_closures()
            .expire_after(PerEntryExpiry)
            .build();
        Self {
            quotes,
            corridors,
            providers,
            ttl,
        }
    }

    fn deadline(base: Duration, jittered: Duration) -> Instant {
        let _ = base;
        Instant::now() + jittered
    }
}

#[async_trait]
impl QuoteCache for InMemoryCache {
    async fn get_quote(&self, key: &str) -> Option<Arc<AggregateResult>> {
        self.quotes.get(key).await.map(|entry| entry.value)
    }

    async fn put_quote(&self, key: String, value: Arc<AggregateResult>) {
        let jittered = self.ttl.jittered(self.ttl.quote_ttl);
        let entry = QuoteEntry {
            value,
            expires_at: Self::deadline(self.ttl.quote_ttl, jittered),
        };
        self.quotes.insert(key, entry).await;
    }

    async fn get_corridor_support(&self, key: &str) -> Option<bool> {
        self.corridors.get(key).await.map(|entry| entry.flag)
    }

    async fn put_corridor_support(&self, key: String, supported: bool) {
        let jittered = self.ttl.jittered(self.ttl.corridor_ttl);
        let entry = FlagEntry {
            flag: supported,
            expires_at: Self::deadline(self.ttl.corridor_ttl, jittered),
        };
        self.corridors.insert(key, entry).await;
    }

    async fn get_provider_enabled(&self, key: &str) -> Option<bool> {
        self.providers.get(key).await.map(|entry| entry.flag)
    }

    async fn put_provider_enabled(&self, key: String, enabled: bool) {
        let jittered = self.ttl.jittered(self.ttl.provider_ttl);
        let entry = FlagEntry {
            flag: enabled,
            expires_at: Self::deadline(self.ttl.provider_ttl, jittered),
        };
        self.providers.insert(key, entry).await;
    }

    async fn invalidate_all_quotes(&self) {
        self.quotes.invalidate_all();
    }

    async fn invalidate_corridor(&self, source_country: &str, dest_country: &str) {
        let prefix = crate::key::quote_corridor_prefix(source_country, dest_country);
        if let Err(error) = self
            .quotes
            .invalidate_entries_if(move |key, _| key.starts_with(&prefix))
        {
            tracing::warn!(?error, "failed to schedule corridor quote invalidation");
        }
        self.corridors
            .invalidate(&crate::key::corridor_key(source_country, dest_country))
            .await;
    }

    async fn invalidate_provider(&self, provider_id: &str) {
        self.providers
            .invalidate(&crate::key::provider_key(provider_id))
            .await;
        let provider_id = provider_id.to_string();
        let matches = move |_: &String, entry: &QuoteEntry| {
            entry
                .value
                .all_providers
                .iter()
                .any(|quote| quote.provider_id == provider_id)
        };
        if let Err(error) = self.quotes.invalidate_entries_if(matches) {
            tracing::warn!(?error, "failed to schedule provider quote invalidation");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use quote_model::{FiltersApplied, ProviderError};
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use uuid::Uuid;

    fn sample_result(provider_ids: &[&str]) -> Arc<AggregateResult> {
        Arc::new(AggregateResult {
            request_id: Uuid::nil(),
            request: None,
            success: true,
            elapsed_ms: 0,
            cache_hit: false,
            timestamp: Utc::now(),
            filters_applied: FiltersApplied::default(),
            all_providers: provider_ids
                .iter()
                .map(|id| quote_model::Quote::failed(
                    *id,
                    dec!(1000),
                    "USD",
                    "MXN",
                    quote_model::ErrorKind::UnsupportedCorridor,
                    "x",
                ))
                .collect(),
            quotes: Vec::new(),
            errors: HashMap::<String, ProviderError>::new(),
        })
    }

    #[tokio::test]
    async fn stores_and_retrieves_a_quote() {
        let cache = InMemoryCache::new(TtlPolicy::default());
        let key = "v1:fee:US:MX:USD:MXN:1000000000".to_string();
        cache.put_quote(key.clone(), sample_result(&["p1"])).await;
        assert!(cache.get_quote(&key).await.is_some());
    }

    #[tokio::test]
    async fn invalidate_corridor_removes_matching_quote_keys() {
        let cache = InMemoryCache::new(TtlPolicy::default());
        let match_key = crate::key::quote_key("US", "MX", "USD", "MXN", 1_000_000_000);
        let other_key = crate::key::quote_key("GB", "IN", "GBP", "INR", 500_000_000);
        cache.put_quote(match_key.clone(), sample_result(&["p1"])).await;
        cache.put_quote(other_key.clone(), sample_result(&["p1"])).await;
        cache.put_corridor_support(crate::key::corridor_key("US", "MX"), true).await;

        cache.invalidate_corridor("US", "MX").await;
        cache.quotes.run_pending_tasks().await;

        assert!(cache.get_quote(&match_key).await.is_none());
        assert!(cache.get_quote(&other_key).await.is_some());
        assert!(cache.get_corridor_support(&crate::key::corridor_key("US", "MX")).await.is_none());
    }

    #[tokio::test]
    async fn invalidate_provider_removes_quotes_containing_it() {
        let cache = InMemoryCache::new(TtlPolicy::default());
        let key = crate::key::quote_key("US", "MX", "USD", "MXN", 1_000_000_000);
        cache.put_quote(key.clone(), sample_result(&["p1", "p2"])).await;
        cache.put_provider_enabled(crate::key::provider_key("p1"), true).await;

        cache.invalidate_provider("p1").await;
        cache.quotes.run_pending_tasks().await;

        assert!(cache.get_quote(&key).await.is_none());
        assert!(cache.get_provider_enabled(&crate::key::provider_key("p1")).await.is_none());
    }
}
