//! Client-facing rate limiting (spec §6): a token bucket per caller IP,
//! grounded on the teacher's `rate-limit` crate name (its source wasn't
//! retrieved for this corpus; `governor`, already idiomatic for this kind
//! of keyed limiter, stands in for it).

use std::{
    net::{IpAddr, SocketAddr},
    num::NonZeroU32,
    sync::Arc,
};

use axum::{
    extract::{ConnectInfo, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{clock::DefaultClock, state::keyed::DefaultKeyedStateStore, Quota, RateLimiter};

pub type ClientLimiter = RateLimiter<IpAddr, DefaultKeyedStateStore<IpAddr>, DefaultClock>;

pub fn build_limiter(per_second: u32) -> Arc<ClientLimiter> {
    let quota = Quota::per_second(NonZeroU32::new(per_second.max(1)).expect("max(1) is never zero"));
    Arc::new(RateLimiter::keyed(quota))
}

/// `axum::middleware::from_fn_with_state` layer: rejects with 429 once a
/// caller's IP exceeds its token bucket, ahead of every other handler (spec
/// §6: "429 when a process-wide client rate limiter rejects the caller").
pub async fn enforce(
    State(limiter): State<Arc<ClientLimiter>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: axum::extract::Request,
    next: Next,
) -> Response {
    match limiter.check_key(&addr.ip()) {
        Ok(()) => next.run(request).await,
        Err(_) => (StatusCode::TOO_MANY_REQUESTS, "rate limit exceeded").into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_bursts_up_to_the_quota_then_rejects() {
        let limiter = build_limiter(1);
        let ip: IpAddr = "127.0.0.1".parse().unwrap();
        assert!(limiter.check_key(&ip).is_ok());
        assert!(limiter.check_key(&ip).is_err());
    }
}
