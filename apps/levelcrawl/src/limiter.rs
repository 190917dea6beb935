//! # Outbound Rate Limiting
//!
//! One limiter shared by every expansion task, so the neighbor service sees
//! at most `rate_limit` requests per second from a crawl no matter how wide
//! the frontier is.
//!
//! ## Configuration
//!
//! - `rate_limit = 0` (default): no limiter is created
//! - `LEVELCRAWL_RATE_LIMIT` / `--rate-limit`: requests per second

use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use std::num::NonZeroU32;
use std::sync::Arc;

// =============================================================================
// RATE LIMITER
// =============================================================================

/// Shared outbound rate limiter type alias.
pub type OutboundLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Create a limiter for `requests_per_second`, or `None` when it is 0.
pub fn create_rate_limiter(requests_per_second: u32) -> Option<OutboundLimiter> {
    let rps = NonZeroU32::new(requests_per_second)?;
    tracing::info!("Outbound rate limit: {} requests/second", rps);
    Some(Arc::new(RateLimiter::direct(Quota::per_second(rps))))
}

/// Wait until the limiter admits one more request.
pub async fn admit(limiter: Option<&OutboundLimiter>) {
    if let Some(limiter) = limiter {
        limiter.until_ready().await;
    }
}

// =============================================================================
// TESTS
// =============================================================================
