//! Rate limiting middleware.
//!
//! Public submissions are limited per client IP address. Each address gets
//! its own token bucket sized from `security.public_rate_limit_per_minute`.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    clock::{Clock, DefaultClock},
    DefaultKeyedRateLimiter, Quota, RateLimiter as GovRateLimiter,
};
use std::{
    net::SocketAddr,
    num::NonZeroU32,
    sync::atomic::{AtomicU64, Ordering},
};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::ClientInfo;

/// Key used when the client address cannot be determined.
const UNKNOWN_CLIENT: &str = "unknown";

/// Idle client buckets are dropped after this many checks.
const PRUNE_EVERY_CHECKS: u64 = 1024;

/// Rate limiter state shared across all requests.
pub struct RateLimiterState {
    limiter: DefaultKeyedRateLimiter<String>,
    checks: AtomicU64,
    rate_limit_per_minute: u32,
}

impl RateLimiterState {
    /// Creates limiter state, or `None` when the limit is 0 (disabled).
    pub fn new(rate_limit_per_minute: u32) -> Option<Self> {
        let per_minute = NonZeroU32::new(rate_limit_per_minute)?;
        Some(Self {
            limiter: GovRateLimiter::keyed(Quota::per_minute(per_minute)),
            checks: AtomicU64::new(0),
            rate_limit_per_minute,
        })
    }

    pub fn rate_limit_per_minute(&self) -> u32 {
        self.rate_limit_per_minute
    }

    /// Number of client buckets currently held.
    pub fn tracked_clients(&self) -> usize {
        self.limiter.len()
    }

    /// Drops buckets that have refilled completely.
    pub fn prune(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }

    /// Returns `Err(retry_after_secs)` when the client is over its limit.
    pub fn check(&self, client: &str) -> Result<(), u64> {
        let seen = self.checks.fetch_add(1, Ordering::Relaxed) + 1;
        if seen % PRUNE_EVERY_CHECKS == 0 {
            self.prune();
        }

        self.limiter
            .check_key(&client.to_string())
            .map_err(|not_until| {
                let wait_time = not_until.wait_time_from(DefaultClock::default().now());
                wait_time.as_secs().max(1)
            })
    }
}

impl std::fmt::Debug for RateLimiterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiterState")
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .field("active_limiters", &self.tracked_clients())
            .finish()
    }
}

/// Middleware that limits requests per client IP address.
///
/// The client is the first `X-Forwarded-For` entry, falling back to the
/// connection's peer address.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let Some(rate_limiter) = state.rate_limiter.as_ref() else {
        return next.run(req).await;
    };

    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client = ClientInfo::from_headers(req.headers(), peer)
        .ip_address
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string());

    if let Err(retry_after) = rate_limiter.check(&client) {
        tracing::warn!(client = %client, retry_after, "Public rate limit exceeded");
        let mut response = ApiError::RateLimited.into_response();
        if let Ok(value) = HeaderValue::from_str(&retry_after.to_string()) {
            response.headers_mut().insert(header::RETRY_AFTER, value);
        }
        return response;
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_disables_limiting() {
        assert!(RateLimiterState::new(0).is_none());
    }

    #[test]
    fn test_rate_limiter_allows_requests() {
        let state = RateLimiterState::new(100).unwrap();
        assert_eq!(state.rate_limit_per_minute(), 100);
        assert!(state.check("203.0.113.7").is_ok());
    }

    #[test]
    fn test_rate_limiter_exhaustion() {
        let state = RateLimiterState::new(2).unwrap();
        let client = "203.0.113.7";

        assert!(state.check(client).is_ok());
        assert!(state.check(client).is_ok());

        let retry_after = state.check(client).unwrap_err();
        assert!(retry_after >= 1);
    }

    #[test]
    fn test_clients_are_limited_independently() {
        let state = RateLimiterState::new(1).unwrap();

        assert!(state.check("198.51.100.1").is_ok());
        assert!(state.check("198.51.100.1").is_err());
        assert!(state.check("198.51.100.2").is_ok());
    }

    #[test]
    fn test_debug_output() {
        let state = RateLimiterState::new(5).unwrap();
        state.check("a").ok();
        let debug = format!("{:?}", state);
        assert!(debug.contains("rate_limit_per_minute: 5"));
        assert!(debug.contains("active_limiters: 1"));
    }

    #[test]
    fn test_prune_drops_refilled_buckets() {
        // One cell per millisecond, so a single used cell refills almost at once.
        let state = RateLimiterState::new(60_000).unwrap();
        state.check("198.51.100.1").ok();
        state.check("198.51.100.2").ok();
        assert_eq!(state.tracked_clients(), 2);

        std::thread::sleep(std::time::Duration::from_millis(50));
        state.prune();
        assert_eq!(state.tracked_clients(), 0);
    }

    #[test]
    fn test_periodic_prune_bounds_distinct_clients() {
        let state = RateLimiterState::new(60_000).unwrap();
        for i in 0..PRUNE_EVERY_CHECKS - 1 {
            state.check(&format!("client-{}", i)).ok();
        }
        assert_eq!(state.tracked_clients(), (PRUNE_EVERY_CHECKS - 1) as usize);

        std::thread::sleep(std::time::Duration::from_millis(50));
        state.check("trigger").ok();
        assert!(state.tracked_clients() <= 1);
    }
}
