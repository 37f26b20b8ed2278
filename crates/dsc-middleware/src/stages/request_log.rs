//! Request logging.
//!
//! Emits one `info` event when a request reaches this stage and one when the
//! response comes back, carrying the status, the number of body bytes
//! written and the elapsed time in microseconds.

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{body_bytes, Request, Response};
use http_body_util::Full;
use std::time::Instant;

/// Middleware that logs the start and completion of every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestLogMiddleware;

impl RequestLogMiddleware {
    /// Creates the middleware.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Middleware for RequestLogMiddleware {
    fn name(&self) -> &'static str {
        "request_log"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let start = Instant::now();

            let uri = request.uri().to_string();
            let method = request.method().clone();
            let remote = ctx
                .remote_addr()
                .map(|addr| addr.to_string())
                .unwrap_or_default();
            let request_id = ctx.request_id();

            tracing::info!(
                request = %uri,
                method = %method,
                remote = %remote,
                request_id = %request_id,
                "started handling request"
            );

            let response = next.run(ctx, request).await;

            let (parts, body) = response.into_parts();
            let body = body_bytes(body).await;
            let duration = start.elapsed();

            tracing::info!(
                request = %uri,
                method = %method,
                remote = %remote,
                request_id = %request_id,
                bytes_written = body.len(),
                status = parts.status.as_u16(),
                duration = duration.as_nanos() as f64 / 1000.0,
                "completed handling request"
            );

            Response::from_parts(parts, Full::new(body))
        })
    }
}
