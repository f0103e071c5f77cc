//! Rate limiting middleware using governor and `tower_governor`.
//!
//! The API routes share one limiter sized for ~100 requests per 15 minutes
//! per client.

use std::sync::Arc;

use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

// =============================================================================
// Client IP Key Extractor
// =============================================================================

/// Key extractor that identifies clients by proxy-reported IP headers.
///
/// Checks `x-forwarded-for`, `x-real-ip`, `cf-connecting-ip`, and
/// `x-client-ip` in order. Requests with none of them share one "unknown"
/// bucket, so a bare local deployment still gets a global cap instead of an
/// open bypass.
#[derive(Clone, Copy)]
pub struct ClientIpKeyExtractor;

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = String;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let headers = req.headers();

        for header in ["x-forwarded-for", "x-real-ip", "cf-connecting-ip", "x-client-ip"] {
            if let Some(value) = headers
                .get(header)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.split(',').next())
                .map(str::trim)
                .filter(|s| !s.is_empty())
            {
                return Ok(value.to_string());
            }
        }

        Ok("unknown".to_string())
    }
}

// =============================================================================
// Rate Limiter Configuration
// =============================================================================

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Create the rate limiter for API endpoints: ~100 requests per 15 minutes
/// per client.
///
/// Configuration: 1 request every 9 seconds (replenish), burst of 100.
///
/// # Panics
///
/// This function will not panic. The configuration uses only valid positive
/// integers (`per_second(9)` and `burst_size(100)`), which are always
/// accepted by `GovernorConfigBuilder`.
#[must_use]
pub fn api_rate_limiter() -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor)
        .per_second(9) // Replenish 1 token every 9 seconds (~100 per 15 min)
        .burst_size(100) // Allow burst of 100 requests
        .finish()
        .expect("rate limiter config with per_second(9) and burst_size(100) is valid");
    GovernorLayer::new(Arc::new(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_governor::key_extractor::KeyExtractor;

    fn request_with_headers(headers: &[(&str, &str)]) -> Request<()> {
        let mut builder = Request::builder().uri("/api/chat");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).expect("build request")
    }

    #[test]
    fn test_extracts_forwarded_for_first_hop() {
        let req = request_with_headers(&[("x-forwarded-for", "203.0.113.9, 10.0.0.1")]);
        let key = ClientIpKeyExtractor.extract(&req).expect("key");
        assert_eq!(key, "203.0.113.9");
    }

    #[test]
    fn test_falls_back_through_header_chain() {
        let req = request_with_headers(&[("x-client-ip", "198.51.100.4")]);
        let key = ClientIpKeyExtractor.extract(&req).expect("key");
        assert_eq!(key, "198.51.100.4");
    }

    #[test]
    fn test_unknown_without_headers() {
        let req = request_with_headers(&[]);
        let key = ClientIpKeyExtractor.extract(&req).expect("key");
        assert_eq!(key, "unknown");
    }
}
