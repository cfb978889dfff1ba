//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. CORS
//! 3. `TraceLayer` (request span with status and latency)
//! 4. Request ID (add unique ID to each request)
//! 5. Timeout (bound every request)
//! 6. Rate limiting on `/register` and `/login` (governor)
//!
//! Bearer-token authentication is an extractor, not a layer.

pub mod auth;
pub mod rate_limit;
pub mod request_id;

pub use auth::RequireAuth;
pub use rate_limit::auth_rate_limiter;
pub use request_id::request_id_middleware;
