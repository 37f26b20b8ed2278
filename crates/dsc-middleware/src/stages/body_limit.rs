//! Request body size limit.
//!
//! A request is rejected with 400 when its declared `Content-Length` is over
//! the limit, when the transport marked it with [`BodyLimitExceeded`], or when
//! the buffered body itself is over the limit.

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{body_bytes, BodyLimitExceeded, Request, Response, ResponseExt};
use http::header::CONTENT_LENGTH;
use http::StatusCode;
use http_body_util::Full;

/// Default limit: 1 MiB.
pub const DEFAULT_MAX_BODY_SIZE: u64 = 1 << 20;

/// Middleware that enforces a maximum request body size.
#[derive(Debug, Clone, Copy)]
pub struct BodyLimitMiddleware {
    max_bytes: u64,
}

impl BodyLimitMiddleware {
    /// Creates the middleware with a limit of `max_bytes`.
    #[must_use]
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    /// Returns the configured limit.
    #[must_use]
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    fn declared_too_large(&self, request: &Request) -> bool {
        request
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok())
            .is_some_and(|length| length > self.max_bytes)
    }
}

impl Default for BodyLimitMiddleware {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BODY_SIZE)
    }
}

impl Middleware for BodyLimitMiddleware {
    fn name(&self) -> &'static str {
        "body_limit"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let too_large = || Response::error(StatusCode::BAD_REQUEST, "request body too large");

            if self.declared_too_large(&request)
                || request.extensions().get::<BodyLimitExceeded>().is_some()
            {
                return too_large();
            }

            let (parts, body) = request.into_parts();
            let body = body_bytes(body).await;
            if body.len() as u64 > self.max_bytes {
                return too_large();
            }

            next.run(ctx, Request::from_parts(parts, Full::new(body)))
                .await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::test_support::echo;
    use bytes::Bytes;

    async fn call(middleware: BodyLimitMiddleware, request: Request) -> (StatusCode, Bytes) {
        let mut ctx = MiddlewareContext::new();
        let response = middleware
            .process(&mut ctx, request, Next::handler(echo()))
            .await;
        let status = response.status();
        (status, body_bytes(response.into_body()).await)
    }

    fn post() -> http::request::Builder {
        http::Request::builder().method("POST").uri("/Nodes")
    }

    #[tokio::test]
    async fn test_small_body_passes_intact() {
        let request = post()
            .body(Full::new(Bytes::from_static(b"hello")))
            .unwrap();
        let (status, body) = call(BodyLimitMiddleware::new(16), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(&body[..], b"hello");
    }

    #[tokio::test]
    async fn test_body_at_limit_passes() {
        let request = post()
            .body(Full::new(Bytes::from_static(b"12345678")))
            .unwrap();
        let (status, _) = call(BodyLimitMiddleware::new(8), request).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_declared_length_over_limit() {
        let request = post()
            .header(CONTENT_LENGTH, "2097152")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let (status, body) = call(BodyLimitMiddleware::default(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(&body[..], b"request body too large");
    }

    #[tokio::test]
    async fn test_buffered_body_over_limit() {
        let request = post()
            .body(Full::new(Bytes::from_static(b"123456789")))
            .unwrap();
        let (status, _) = call(BodyLimitMiddleware::new(8), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_transport_marker_rejects() {
        let mut request = post().body(Full::new(Bytes::new())).unwrap();
        request.extensions_mut().insert(BodyLimitExceeded);
        let (status, _) = call(BodyLimitMiddleware::default(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_default_limit() {
        assert_eq!(BodyLimitMiddleware::default().max_bytes(), 1_048_576);
    }
}
