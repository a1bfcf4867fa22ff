//! Security Headers Middleware
//!
//! Adds the standard hardening headers to every response. HSTS is only sent
//! when the server sits behind TLS (`server.enable_hsts`).

use axum::{
    body::Body,
    http::{header, HeaderValue, Request, Response},
};
use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};
use tower::{Layer, Service};

use crate::config::ServerSettings;

/// Security headers configuration
#[derive(Clone, Debug)]
pub struct SecurityHeadersConfig {
    pub enable_hsts: bool,
    /// HSTS max-age in seconds
    pub hsts_max_age: u64,
    pub content_security_policy: String,
    pub referrer_policy: String,
    pub permissions_policy: String,
}

impl Default for SecurityHeadersConfig {
    fn default() -> Self {
        Self {
            enable_hsts: false,
            hsts_max_age: 31_536_000,
            content_security_policy: "default-src 'self'; frame-ancestors 'none'".to_string(),
            referrer_policy: "strict-origin-when-cross-origin".to_string(),
            permissions_policy: "geolocation=(), microphone=(), camera=()".to_string(),
        }
    }
}

impl From<&ServerSettings> for SecurityHeadersConfig {
    fn from(settings: &ServerSettings) -> Self {
        Self {
            enable_hsts: settings.enable_hsts,
            ..Default::default()
        }
    }
}

/// Layer that adds security headers to responses
#[derive(Clone, Default)]
pub struct SecurityHeadersLayer {
    config: SecurityHeadersConfig,
}

impl SecurityHeadersLayer {
    pub fn with_config(config: SecurityHeadersConfig) -> Self {
        Self { config }
    }
}

impl<S> Layer<S> for SecurityHeadersLayer {
    type Service = SecurityHeadersMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SecurityHeadersMiddleware {
            inner,
            config: self.config.clone(),
        }
    }
}

/// Middleware service that adds security headers
#[derive(Clone)]
pub struct SecurityHeadersMiddleware<S> {
    inner: S,
    config: SecurityHeadersConfig,
}

impl<S> Service<Request<Body>> for SecurityHeadersMiddleware<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        // the clone may not be ready; swap so the polled service handles this call
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let config = self.config.clone();

        Box::pin(async move {
            let mut response = inner.call(request).await?;
            let headers = response.headers_mut();

            headers.insert(
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            );
            headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));

            if config.enable_hsts {
                if let Ok(value) =
                    HeaderValue::from_str(&format!("max-age={}; includeSubDomains", config.hsts_max_age))
                {
                    headers.insert(header::STRICT_TRANSPORT_SECURITY, value);
                }
            }

            if let Ok(value) = HeaderValue::from_str(&config.content_security_policy) {
                headers.insert(header::CONTENT_SECURITY_POLICY, value);
            }
            if let Ok(value) = HeaderValue::from_str(&config.referrer_policy) {
                headers.insert(header::REFERRER_POLICY, value);
            }
            if let Ok(value) = HeaderValue::from_str(&config.permissions_policy) {
                headers.insert(header::HeaderName::from_static("permissions-policy"), value);
            }

            Ok(response)
        })
    }
}

/// Security headers layer configured from the server settings.
pub fn create_security_headers_layer(settings: &ServerSettings) -> SecurityHeadersLayer {
    SecurityHeadersLayer::with_config(SecurityHeadersConfig::from(settings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::get, Router};
    use tower::ServiceExt;

    async fn ok() -> &'static str {
        "OK"
    }

    async fn headers_for(layer: SecurityHeadersLayer) -> axum::http::HeaderMap {
        let app = Router::new().route("/", get(ok)).layer(layer);
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        app.oneshot(request).await.unwrap().headers().clone()
    }

    #[tokio::test]
    async fn test_security_headers_added() {
        let headers = headers_for(SecurityHeadersLayer::default()).await;

        assert_eq!(headers.get(header::X_CONTENT_TYPE_OPTIONS).unwrap(), "nosniff");
        assert_eq!(headers.get(header::X_FRAME_OPTIONS).unwrap(), "DENY");
        assert_eq!(
            headers.get(header::REFERRER_POLICY).unwrap(),
            "strict-origin-when-cross-origin"
        );
        assert!(headers.get(header::CONTENT_SECURITY_POLICY).is_some());
        assert!(headers.get(header::STRICT_TRANSPORT_SECURITY).is_none());
    }

    #[tokio::test]
    async fn test_hsts_follows_server_settings() {
        let settings = ServerSettings {
            host: "127.0.0.1".into(),
            port: 8080,
            enable_hsts: true,
        };
        let headers = headers_for(create_security_headers_layer(&settings)).await;

        assert_eq!(
            headers.get(header::STRICT_TRANSPORT_SECURITY).unwrap(),
            "max-age=31536000; includeSubDomains"
        );
    }
}
