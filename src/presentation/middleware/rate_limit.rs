//! Rate Limiting Middleware
//!
//! In-process fixed-window rate limiting for the credential endpoints
//! (`/login`, `/register`). Counters live in a `DashMap` keyed by client.

use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;

use crate::config::RateLimitSettings;
use crate::shared::error::AppError;
use crate::shared::i18n::Locale;
use crate::startup::AppState;

/// Rate limit status of one client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitInfo {
    /// Maximum requests allowed in the current window
    pub limit: u32,
    /// Remaining requests in the current window
    pub remaining: u32,
    /// Seconds until the window resets
    pub retry_after: u64,
}

/// Stale windows are purged once this many clients are tracked.
const MAX_TRACKED_CLIENTS: usize = 10_000;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window counter per client identifier.
#[derive(Debug)]
pub struct RateLimiter {
    windows: DashMap<String, Window>,
    limit: u32,
    window: Duration,
    trust_proxy: bool,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            windows: DashMap::new(),
            limit,
            window,
            trust_proxy: false,
        }
    }

    pub fn from_settings(settings: &RateLimitSettings) -> Self {
        Self {
            trust_proxy: settings.trust_proxy,
            ..Self::new(
                settings.auth_requests_per_window,
                Duration::from_secs(settings.window_seconds),
            )
        }
    }

    /// Count one request from `identifier`.
    ///
    /// Returns `Ok` while the client is under the limit, `Err` once the
    /// current window is exhausted.
    pub fn check(&self, identifier: &str) -> Result<RateLimitInfo, RateLimitInfo> {
        if self.windows.len() >= MAX_TRACKED_CLIENTS {
            self.purge_expired();
        }
        self.check_at(identifier, Instant::now())
    }

    fn check_at(&self, identifier: &str, now: Instant) -> Result<RateLimitInfo, RateLimitInfo> {
        let mut entry = self
            .windows
            .entry(identifier.to_string())
            .or_insert(Window {
                started: now,
                count: 0,
            });

        let elapsed = now.saturating_duration_since(entry.started);
        if elapsed >= self.window {
            entry.started = now;
            entry.count = 0;
        }

        let retry_after = self
            .window
            .saturating_sub(now.saturating_duration_since(entry.started))
            .as_secs()
            .max(1);

        if entry.count >= self.limit {
            return Err(RateLimitInfo {
                limit: self.limit,
                remaining: 0,
                retry_after,
            });
        }

        entry.count += 1;
        Ok(RateLimitInfo {
            limit: self.limit,
            remaining: self.limit - entry.count,
            retry_after: 0,
        })
    }

    /// Drop windows that have expired.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.windows
            .retain(|_, w| now.saturating_duration_since(w.started) < self.window);
    }
}

/// Extract the rate limit identifier from a request.
///
/// With `trust_proxy` the forwarded headers win:
/// 1. X-Forwarded-For header (first address in the chain)
/// 2. X-Real-IP header
///
/// Otherwise, or when neither header holds an address, the socket address
/// is used.
fn extract_identifier(request: &Request, client_ip: Option<IpAddr>, trust_proxy: bool) -> String {
    if trust_proxy {
        if let Some(ip) = forwarded_ip(request) {
            return format!("ip:{}", ip);
        }
    }

    match client_ip {
        Some(ip) => format!("ip:{}", ip),
        None => {
            tracing::warn!("Could not determine client identifier for rate limiting");
            "ip:unknown".to_string()
        }
    }
}

fn forwarded_ip(request: &Request) -> Option<IpAddr> {
    let headers = request.headers();

    let forwarded_for = headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|chain| chain.split(',').next())
        .and_then(|ip| ip.trim().parse().ok());

    forwarded_for.or_else(|| {
        headers
            .get("x-real-ip")
            .and_then(|h| h.to_str().ok())
            .and_then(|ip| ip.trim().parse().ok())
    })
}

/// Rate limiting middleware for authentication endpoints.
pub async fn rate_limit_auth(
    State(state): State<AppState>,
    locale: Locale,
    request: Request,
    next: Next,
) -> Response {
    let client_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip());
    let identifier = extract_identifier(&request, client_ip, state.rate_limiter.trust_proxy);

    match state.rate_limiter.check(&identifier) {
        Ok(info) => {
            let mut response = next.run(request).await;
            add_rate_limit_headers(response.headers_mut(), &info);
            response
        }
        Err(info) => {
            tracing::warn!(identifier = %identifier, "Rate limit exceeded");
            rate_limited_response(info, locale)
        }
    }
}

fn add_rate_limit_headers(headers: &mut header::HeaderMap, info: &RateLimitInfo) {
    headers.insert("X-RateLimit-Limit", header::HeaderValue::from(info.limit));
    headers.insert(
        "X-RateLimit-Remaining",
        header::HeaderValue::from(info.remaining),
    );
}

/// 429 built from `AppError::RateLimited` plus the window headers.
fn rate_limited_response(info: RateLimitInfo, locale: Locale) -> Response {
    let mut response = AppError::RateLimited {
        message: locale.t("error.rateLimited").to_string(),
        retry_after: info.retry_after,
    }
    .into_response();
    add_rate_limit_headers(response.headers_mut(), &info);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_allows_until_limit() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));
        let now = Instant::now();

        assert_eq!(limiter.check_at("ip:1.2.3.4", now).unwrap().remaining, 1);
        assert_eq!(limiter.check_at("ip:1.2.3.4", now).unwrap().remaining, 0);

        let rejected = limiter.check_at("ip:1.2.3.4", now).unwrap_err();
        assert_eq!(rejected.retry_after, 60);

        // other clients have their own window
        assert!(limiter.check_at("ip:5.6.7.8", now).is_ok());
    }

    #[test]
    fn test_window_resets() {
        let limiter = RateLimiter::new(1, Duration::from_secs(10));
        let start = Instant::now();

        assert!(limiter.check_at("k", start).is_ok());
        assert!(limiter.check_at("k", start + Duration::from_secs(5)).is_err());
        assert!(limiter.check_at("k", start + Duration::from_secs(10)).is_ok());
    }

    #[test]
    fn test_purge_expired() {
        let limiter = RateLimiter::new(1, Duration::from_millis(0));
        limiter.check("k").ok();
        limiter.purge_expired();
        assert!(limiter.windows.is_empty());
    }

    fn forwarded_request() -> Request {
        Request::builder()
            .header("x-forwarded-for", "10.0.0.1, 10.0.0.2")
            .header("x-real-ip", "10.0.0.9")
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn test_identifier_prefers_forwarded_header_behind_proxy() {
        let ip: IpAddr = "127.0.0.1".parse().unwrap();
        assert_eq!(
            extract_identifier(&forwarded_request(), Some(ip), true),
            "ip:10.0.0.1"
        );

        let request = Request::builder()
            .header("x-real-ip", "10.0.0.9")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract_identifier(&request, Some(ip), true), "ip:10.0.0.9");

        let request = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(extract_identifier(&request, Some(ip), true), "ip:127.0.0.1");
    }

    #[test]
    fn test_identifier_ignores_forwarded_headers_without_proxy() {
        let ip: IpAddr = "192.168.1.20".parse().unwrap();
        assert_eq!(
            extract_identifier(&forwarded_request(), Some(ip), false),
            "ip:192.168.1.20"
        );
        assert_eq!(
            extract_identifier(&forwarded_request(), None, false),
            "ip:unknown"
        );
    }

    #[test]
    fn test_limiter_reads_trust_proxy_from_settings() {
        let limiter = RateLimiter::from_settings(&RateLimitSettings {
            auth_requests_per_window: 3,
            window_seconds: 30,
            trust_proxy: true,
        });
        assert!(limiter.trust_proxy);
        assert_eq!(limiter.limit, 3);
        assert!(!RateLimiter::new(3, Duration::from_secs(30)).trust_proxy);
    }

    #[tokio::test]
    async fn test_rejection_is_rate_limited_error() {
        let info = RateLimitInfo {
            limit: 5,
            remaining: 0,
            retry_after: 42,
        };
        let response = rate_limited_response(info, Locale::En);

        assert_eq!(response.status(), axum::http::StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "42");
        assert_eq!(response.headers()["x-ratelimit-limit"], "5");
        assert_eq!(response.headers()["x-ratelimit-remaining"], "0");

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], 10006);
        assert_eq!(body["message"], "Too many requests, try again later");
    }
}
