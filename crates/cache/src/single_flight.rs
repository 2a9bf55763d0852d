//! Single-flight de-duplication (spec §4.G): at most one fan-out in flight
//! per cache key. Concurrent callers for the same key await the first
//! caller's result; past a bounded wait they give up and proceed
//! independently rather than wait forever for a leader that may be slow or
//! gone, matching the spec's "hash-based lock with bounded wait queue" and
//! the teacher's `request-sharing` crate (declared, if not retrieved, as a
//! `price-estimation` dependency for exactly this purpose).

use std::time::Duration;

use dashmap::{mapref::entry::Entry, DashMap};
use tokio::sync::broadcast;

/// Default bound on how long a follower waits for the leader before it
/// proceeds independently (spec §4.G "bounded wait queue").
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_millis(1_500);

/// Deduplicates concurrent work on the same `String` key. `T` is the shared
/// result type; it must be cheap to clone (callers pass `Arc<...>` in
/// practice).
pub struct SingleFlight<T> {
    inflight: DashMap<String, broadcast::Sender<T>>,
    wait_timeout: Duration,
}

impl<T: Clone + Send + 'static> SingleFlight<T> {
    pub fn new(wait_timeout: Duration) -> Self {
        Self {
            inflight: DashMap::new(),
            wait_timeout,
        }
    }

    /// Runs `work` for `key` unless another caller is already running it.
    /// The first caller for a key becomes the leader and actually executes
    /// `work`; every other concurrent caller for the same key awaits the
    /// leader's broadcast result, falling back to running `work` itself if
    /// the wait exceeds `wait_timeout` (the leader stalled, panicked, or the
    /// channel closed before sending).
    pub async fn run<F, Fut>(&self, key: &str, work: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = T>,
    {
        let (sender, became_leader) = match self.inflight.entry(key.to_string()) {
            Entry::Occupied(entry) => (entry.get().clone(), false),
            Entry::Vacant(entry) => {
                let (sender, _receiver) = broadcast::channel(1);
                entry.insert(sender.clone());
                (sender, true)
            }
        };

        if became_leader {
            let result = work().await;
            // Remove before broadcasting so a follower that arrives between
            // the broadcast and the removal still finds no leader and simply
            // re-runs `work`, rather than subscribing to a channel nobody
            // will ever send on again.
            self.inflight.remove(key);
            let _ = sender.send(result.clone());
            return result;
        }

        let mut receiver = sender.subscribe();
        match tokio::time::timeout(self.wait_timeout, receiver.recv()).await {
            Ok(Ok(value)) => value,
            Ok(Err(_)) | Err(_) => work().await,
        }
    }
}

impl<T: Clone + Send + 'static> Default for SingleFlight<T> {
    fn default() -> Self {
        Self::new(DEFAULT_WAIT_TIMEOUT)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use super::*;

    #[tokio::test]
    async fn concurrent_callers_share_a_single_execution() {
        let single_flight = Arc::new(SingleFlight::<u32>::default());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let single_flight = single_flight.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                single_flight
                    .run("k", || {
                        let calls = calls.clone();
                        async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(20)).await;
                            42
                        }
                    })
                    .await
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), 42);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn distinct_keys_run_independently() {
        let single_flight = SingleFlight::<u32>::default();
        let a = single_flight.run("a", || async { 1 });
        let b = single_flight.run("b", || async { 2 });
        assert_eq!(tokio::join!(a, b), (1, 2));
    }

    #[tokio::test]
    async fn follower_past_wait_timeout_runs_independently() {
        let single_flight = Arc::new(SingleFlight::<u32>::new(Duration::from_millis(10)));
        let leader = {
            let single_flight = single_flight.clone();
            tokio::spawn(async move {
                single_flight
                    .run("k", || async {
                        tokio::time::sleep(Duration::from_millis(200)).await;
                        1
                    })
                    .await
            })
        };
        // give the leader time to register before the follower arrives.
        tokio::time::sleep(Duration::from_millis(5)).await;
        let follower = single_flight.run("k", || async { 2 }).await;
        assert_eq!(follower, 2);
        assert_eq!(leader.await.unwrap(), 1);
    }
}
