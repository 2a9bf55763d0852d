use std::time::Duration;

use tokio::time::Instant;

/// A point in time by which an adapter's `quote()` call must have returned
/// (spec §4.B rule 2 / §4.E). Wraps `tokio::time::Instant` so adapters can
/// race their own inner HTTP timeouts against it without the executor and
/// the adapter drifting out of sync.
#[derive(Clone, Copy, Debug)]
pub struct Deadline(Instant);

impl Deadline {
    pub fn after(duration: Duration) -> Self {
        Self(Instant::now() + duration)
    }

    pub fn at(instant: Instant) -> Self {
        Self(instant)
    }

    pub fn instant(&self) -> Instant {
        self.0
    }

    pub fn has_passed(&self) -> bool {
        Instant::now() >= self.0
    }

    /// Time left before the deadline, or `Duration::ZERO` if it has already
    /// passed. Adapters use this to bound a retry's backoff (spec §4.B
    /// rule 3: "bounded by the remaining budget").
    pub fn remaining(&self) -> Duration {
        self.0.saturating_duration_since(Instant::now())
    }
}
