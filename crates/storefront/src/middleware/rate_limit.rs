//! Per-IP rate limiting built on governor / `tower_governor`.
//!
//! Two tiers: a strict limiter in front of the credential endpoints and a
//! loose one for the rest of the API. Both key on the client IP as
//! reported by the CDN.

use std::net::IpAddr;
use std::sync::Arc;

use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

/// Resolves the client IP from CDN and proxy headers.
///
/// Cloudflare's `CF-Connecting-IP` wins; the generic proxy headers are
/// spoofable and only consulted after it.
#[derive(Clone, Copy)]
pub struct ClientIpKeyExtractor;

fn parse_ip(s: &str) -> Option<IpAddr> {
    s.trim().parse().ok()
}

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let header = |name: &str| req.headers().get(name).and_then(|v| v.to_str().ok());

        header("cf-connecting-ip")
            .and_then(parse_ip)
            .or_else(|| {
                // First entry in the chain is the originating client
                header("x-forwarded-for")
                    .and_then(|v| v.split(',').next())
                    .and_then(parse_ip)
            })
            .or_else(|| header("x-real-ip").and_then(parse_ip))
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

/// The governor layer type the route builders attach.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Limiter for the credential endpoints: roughly 10 requests per minute
/// per IP (one token every 6 seconds, burst of 5). Keeps password
/// guessing slow.
///
/// # Panics
///
/// `finish` only rejects zero intervals or burst sizes; both values here
/// are fixed nonzero constants.
#[must_use]
pub fn auth_rate_limiter() -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor)
        .per_second(6)
        .burst_size(5)
        .finish()
        .expect("per_second(6) / burst_size(5) is a valid governor config");
    GovernorLayer::new(Arc::new(config))
}

/// Limiter for the rest of the API: roughly 100 requests per minute per
/// IP (one token per second, burst of 50).
///
/// # Panics
///
/// `finish` only rejects zero intervals or burst sizes; both values here
/// are fixed nonzero constants.
#[must_use]
pub fn api_rate_limiter() -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor)
        .per_second(1)
        .burst_size(50)
        .finish()
        .expect("per_second(1) / burst_size(50) is a valid governor config");
    GovernorLayer::new(Arc::new(config))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tower_governor::key_extractor::KeyExtractor;

    use super::*;

    fn request_with_header(name: &str, value: &str) -> Request<()> {
        Request::builder().header(name, value).body(()).unwrap()
    }

    #[test]
    fn test_prefers_cloudflare_header() {
        let req = Request::builder()
            .header("cf-connecting-ip", "203.0.113.9")
            .header("x-forwarded-for", "198.51.100.1, 10.0.0.1")
            .body(())
            .unwrap();

        let key = ClientIpKeyExtractor.extract(&req).unwrap();
        assert_eq!(key, "203.0.113.9".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_uses_first_forwarded_for_entry() {
        let req = request_with_header("x-forwarded-for", "198.51.100.1, 10.0.0.1");

        let key = ClientIpKeyExtractor.extract(&req).unwrap();
        assert_eq!(key, "198.51.100.1".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_falls_back_to_real_ip() {
        let req = request_with_header("x-real-ip", "192.0.2.44");

        let key = ClientIpKeyExtractor.extract(&req).unwrap();
        assert_eq!(key, "192.0.2.44".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_garbage_forwarded_for_is_not_an_ip() {
        let req = request_with_header("x-forwarded-for", "not-an-address");

        assert!(ClientIpKeyExtractor.extract(&req).is_err());
    }

    #[test]
    fn test_errors_without_any_header() {
        let req = Request::builder().body(()).unwrap();

        assert!(ClientIpKeyExtractor.extract(&req).is_err());
    }
}
