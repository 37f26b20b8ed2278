//! Protocol version gate.
//!
//! Agents declare the protocol they speak in the `ProtocolVersion` header.
//! Only version 2.0 is served; anything else, including a missing header, is
//! answered with 501 before any other stage runs. Responses that pass the
//! gate are stamped with the same header.

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{Request, Response, ResponseExt};
use dsc_core::PROTOCOL_VERSION;
use http::header::{HeaderName, HeaderValue};
use http::StatusCode;

/// The protocol version header (`ProtocolVersion` on the wire).
pub const PROTOCOL_VERSION_HEADER: HeaderName = HeaderName::from_static("protocolversion");

/// Middleware that rejects requests for unsupported protocol versions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProtocolVersionMiddleware;

impl ProtocolVersionMiddleware {
    /// Creates the middleware.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn declared(request: &Request) -> String {
        request
            .headers()
            .get(&PROTOCOL_VERSION_HEADER)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
            .unwrap_or_default()
    }
}

impl Middleware for ProtocolVersionMiddleware {
    fn name(&self) -> &'static str {
        "protocol_version"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let declared = Self::declared(&request);
            if declared != PROTOCOL_VERSION {
                return Response::error(
                    StatusCode::NOT_IMPLEMENTED,
                    &format!("protocol version {declared:?} not supported"),
                );
            }

            let mut response = next.run(ctx, request).await;
            response.headers_mut().insert(
                PROTOCOL_VERSION_HEADER,
                HeaderValue::from_static(PROTOCOL_VERSION),
            );
            response
        })
    }
}
