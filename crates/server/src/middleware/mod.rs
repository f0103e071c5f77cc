//! HTTP middleware stack.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. CORS (permissive, the UI is served from another origin)
//! 4. Rate limiting (governor, API routes only)

pub mod rate_limit;

pub use rate_limit::{ClientIpKeyExtractor, api_rate_limiter};
