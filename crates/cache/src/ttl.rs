use std::time::Duration;

use rand::Rng;

/// Base TTLs (spec §4.G defaults, overridable via configuration).
pub const DEFAULT_QUOTE_TTL_SECONDS: u64 = 1_800;
pub const DEFAULT_CORRIDOR_TTL_SECONDS: u64 = 43_200;
pub const DEFAULT_PROVIDER_TTL_SECONDS: u64 = 86_400;
pub const DEFAULT_JITTER_MAX_SECONDS: u64 = 300;

/// `actual_ttl = base_ttl + uniform(0, jitter_max_seconds)` (spec §4.G),
/// used on every insert to avoid synchronized expiry across many callers
/// (the "thundering herd" / stampede the glossary calls out).
#[derive(Clone, Copy, Debug)]
pub struct TtlPolicy {
    pub quote_ttl: Duration,
    pub corridor_ttl: Duration,
    pub provider_ttl: Duration,
    pub jitter_max: Duration,
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self {
            quote_ttl: Duration::from_secs(DEFAULT_QUOTE_TTL_SECONDS),
            corridor_ttl: Duration::from_secs(DEFAULT_CORRIDOR_TTL_SECONDS),
            provider_ttl: Duration::from_secs(DEFAULT_PROVIDER_TTL_SECONDS),
            jitter_max: Duration::from_secs(DEFAULT_JITTER_MAX_SECONDS),
        }
    }
}

impl TtlPolicy {
    pub fn jittered(&self, base: Duration) -> Duration {
        jittered(base, self.jitter_max)
    }
}

fn jittered(base: Duration, jitter_max: Duration) -> Duration {
    if jitter_max.is_zero() {
        return base;
    }
    let jitter_ms = rand::thread_rng().gen_range(0..=jitter_max.as_millis() as u64);
    base + Duration::from_millis(jitter_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jittered_ttl_never_goes_below_base() {
        let policy = TtlPolicy::default();
        for _ in 0..100 {
            let ttl = policy.jittered(policy.quote_ttl);
            assert!(ttl >= policy.quote_ttl);
            assert!(ttl <= policy.quote_ttl + policy.jitter_max);
        }
    }

    #[test]
    fn zero_jitter_is_exact() {
        let policy = TtlPolicy {
            jitter_max: Duration::ZERO,
            ..TtlPolicy::default()
        };
        assert_eq!(policy.jittered(policy.quote_ttl), policy.quote_ttl);
    }
}
