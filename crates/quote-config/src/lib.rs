//! Environment/CLI configuration (spec §6), mirroring
//! `crates/autopilot/src/arguments.rs`: a `clap::Parser` derive struct with
//! `#[clap(long, env, default_value = "...")]` fields for every environment
//! variable the specification names, plus the ambient fields every service
//! in this corpus carries (bind addresses, log filter).

use std::{collections::HashMap, net::SocketAddr, time::Duration};

use rust_decimal::Decimal;
use serde::Serialize;

/// `clap::value_parser` for a plain integer-seconds environment variable,
/// matching `shared::arguments::duration_from_seconds`.
pub fn duration_from_seconds(s: &str) -> Result<Duration, String> {
    let seconds: u64 = s
        .parse()
        .map_err(|_| format!("{s:?} is not a whole number of seconds"))?;
    Ok(Duration::from_secs(seconds))
}

fn duration_from_millis(s: &str) -> Result<Duration, String> {
    let millis: u64 = s
        .parse()
        .map_err(|_| format!("{s:?} is not a whole number of milliseconds"))?;
    Ok(Duration::from_millis(millis))
}

#[derive(clap::Parser, Debug)]
pub struct Arguments {
    /// Base TTL for cached aggregate quote results (spec §4.G default 1800s).
    #[clap(
        long,
        env,
        default_value = "1800",
        value_parser = duration_from_seconds,
    )]
    pub quote_cache_ttl: Duration,

    /// Base TTL for cached corridor-support results (spec §4.G default
    /// 43200s).
    #[clap(
        long,
        env,
        default_value = "43200",
        value_parser = duration_from_seconds,
    )]
    pub corridor_cache_ttl: Duration,

    /// Base TTL for cached provider metadata (spec §4.G default 86400s).
    #[clap(
        long,
        env,
        default_value = "86400",
        value_parser = duration_from_seconds,
    )]
    pub provider_cache_ttl: Duration,

    /// Upper bound of the uniform TTL jitter added on every cache insert
    /// (spec §4.G default 300s).
    #[clap(
        long,
        env,
        default_value = "300",
        value_parser = duration_from_seconds,
    )]
    pub jitter_max_seconds: Duration,

    /// Default per-adapter deadline, overridable per request via
    /// `per_provider_timeout_ms` (spec §4.E default 30000ms).
    #[clap(
        long,
        env,
        default_value = "30000",
        value_parser = duration_from_millis,
    )]
    pub per_provider_timeout_ms: Duration,

    /// Default fan-out worker pool size. `None` means "number of active
    /// adapters, capped at 32" (spec §4.E).
    #[clap(long, env)]
    pub aggregator_max_workers: Option<usize>,

    /// How long a single-flight follower waits for the leader's result
    /// before running independently (spec §4.G "bounded wait queue").
    #[clap(
        long,
        env,
        default_value = "1500",
        value_parser = duration_from_millis,
    )]
    pub single_flight_wait_timeout_ms: Duration,

    /// Requests above this amount are rejected with `InvalidParameter`
    /// (spec §3 "a configurable cap").
    #[clap(long, env, default_value = "1000000")]
    pub max_request_amount: Decimal,

    #[clap(long, env, default_value = "0.0.0.0:9589")]
    pub metrics_address: SocketAddr,

    #[clap(long, env, default_value = "0.0.0.0:8080")]
    pub api_address: SocketAddr,

    /// Maximum client requests per second accepted at the HTTP surface
    /// before `429 RateLimit` is returned (spec §6).
    #[clap(long, env, default_value = "50")]
    pub client_rate_limit_per_second: u32,

    #[clap(long, env, default_value = "info,quote_aggregator=debug")]
    pub log_filter: String,
}

impl std::fmt::Display for Arguments {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "quote_cache_ttl: {:?}", self.quote_cache_ttl)?;
        writeln!(f, "corridor_cache_ttl: {:?}", self.corridor_cache_ttl)?;
        writeln!(f, "provider_cache_ttl: {:?}", self.provider_cache_ttl)?;
        writeln!(f, "jitter_max_seconds: {:?}", self.jitter_max_seconds)?;
        writeln!(f, "per_provider_timeout_ms: {:?}", self.per_provider_timeout_ms)?;
        display_option(f, "aggregator_max_workers", &self.aggregator_max_workers)?;
        writeln!(
            f,
            "single_flight_wait_timeout_ms: {:?}",
            self.single_flight_wait_timeout_ms
        )?;
        writeln!(f, "max_request_amount: {}", self.max_request_amount)?;
        writeln!(f, "metrics_address: {}", self.metrics_address)?;
        writeln!(f, "api_address: {}", self.api_address)?;
        writeln!(
            f,
            "client_rate_limit_per_second: {}",
            self.client_rate_limit_per_second
        )?;
        writeln!(f, "log_filter: {}", self.log_filter)?;
        Ok(())
    }
}

/// `shared::arguments::display_option`'s counterpart: prints `None` as
/// `None` and `Some(x)` as `x`, rather than Rust's `Some(x)`/`None` debug
/// form, for a cleaner startup log line.
fn display_option(
    f: &mut std::fmt::Formatter<'_>,
    name: &str,
    value: &impl std::fmt::Debug,
) -> std::fmt::Result {
    writeln!(f, "{name}: {value:?}")
}

/// Per-provider credential environment variables (spec §6: "names mirror
/// provider id"). `clap` has no first-class support for an unbounded,
/// prefix-matched set of env vars, so these are read directly from the
/// process environment rather than declared as `Arguments` fields.
pub fn provider_credentials() -> HashMap<String, String> {
    const PREFIX: &str = "PROVIDER_CREDENTIALS_";
    std::env::vars()
        .filter_map(|(key, value)| {
            key.strip_prefix(PREFIX)
                .map(|provider_id| (provider_id.to_ascii_lowercase(), value))
        })
        .collect()
}

/// The subset of `Arguments` the cache layer needs, kept serializable so it
/// can be logged structurally if desired.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct CacheTtlSeconds {
    pub quote: u64,
    pub corridor: u64,
    pub provider: u64,
    pub jitter_max: u64,
}

impl From<&Arguments> for CacheTtlSeconds {
    fn from(args: &Arguments) -> Self {
        Self {
            quote: args.quote_cache_ttl.as_secs(),
            corridor: args.corridor_cache_ttl.as_secs(),
            provider: args.provider_cache_ttl.as_secs(),
            jitter_max: args.jitter_max_seconds.as_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parses_defaults_with_no_env_or_args() {
        let args = Arguments::parse_from(["quote-aggregator"]);
        assert_eq!(args.quote_cache_ttl, Duration::from_secs(1800));
        assert_eq!(args.per_provider_timeout_ms, Duration::from_millis(30000));
        assert_eq!(args.aggregator_max_workers, None);
    }

    #[test]
    fn overrides_from_flags() {
        let args = Arguments::parse_from([
            "quote-aggregator",
            "--quote-cache-ttl",
            "60",
            "--aggregator-max-workers",
            "4",
        ]);
        assert_eq!(args.quote_cache_ttl, Duration::from_secs(60));
        assert_eq!(args.aggregator_max_workers, Some(4));
    }

    #[test]
    fn provider_credentials_reads_prefixed_env_vars() {
        std::env::set_var("PROVIDER_CREDENTIALS_WISE", "secret-token");
        let creds = provider_credentials();
        assert_eq!(creds.get("wise").map(String::as_str), Some("secret-token"));
        std::env::remove_var("PROVIDER_CREDENTIALS_WISE");
    }
}
