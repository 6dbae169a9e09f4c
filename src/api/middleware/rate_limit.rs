//! Per-client rate limiting using the token bucket algorithm.
//!
//! The key is the socket peer address, or, behind a trusted proxy, the client IP reported
//! in `X-Forwarded-For` / `X-Real-IP`. Rejected requests receive `429 Too Many Requests`.

use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer,
    governor::GovernorConfigBuilder,
    key_extractor::{KeyExtractor, PeerIpKeyExtractor, SmartIpKeyExtractor},
};

/// Bucket refill rate and size.
#[derive(Debug, Clone, Copy)]
pub struct Quota {
    pub per_second: u64,
    pub burst: u32,
}

/// Link management API.
pub const API: Quota = Quota {
    per_second: 2,
    burst: 50,
};

/// Public redirects, which see far more traffic per client.
pub const REDIRECT: Quota = Quota {
    per_second: 20,
    burst: 200,
};

pub type Layer<K> = GovernorLayer<K, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

fn build<K>(quota: Quota, key_extractor: K) -> Layer<K>
where
    K: KeyExtractor,
{
    let config = GovernorConfigBuilder::default()
        .per_second(quota.per_second)
        .burst_size(quota.burst)
        .key_extractor(key_extractor)
        .finish()
        .expect("rate limit quota must be non-zero");

    GovernorLayer::new(Arc::new(config))
}

/// Keyed by the socket peer address. Requires `into_make_service_with_connect_info`.
pub fn peer_layer(quota: Quota) -> Layer<PeerIpKeyExtractor> {
    build(quota, PeerIpKeyExtractor)
}

/// Keyed by the forwarded client IP, falling back to the peer address.
pub fn proxied_layer(quota: Quota) -> Layer<SmartIpKeyExtractor> {
    build(quota, SmartIpKeyExtractor)
}
