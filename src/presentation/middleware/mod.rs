//! Middleware
//!
//! Tower middleware for request processing.

pub mod auth;
pub mod cors;
pub mod logging;
pub mod rate_limit;
pub mod security;

pub use auth::{auth_middleware, require_admin, AuthUser};
pub use rate_limit::{rate_limit_auth, RateLimitInfo, RateLimiter};
pub use security::{create_security_headers_layer, SecurityHeadersConfig, SecurityHeadersLayer};
