//! Common types used throughout the middleware pipeline.
//!
//! Request bodies are fully buffered by the transport (up to the body limit)
//! before the pipeline runs, so requests and responses both carry a
//! `Full<Bytes>` body.

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::StatusCode;
use http_body_util::{BodyExt, Full};

/// The HTTP request type used in the middleware pipeline.
pub type Request = http::Request<Full<Bytes>>;

/// The HTTP response type used in the middleware pipeline.
pub type Response = http::Response<Full<Bytes>>;

/// Request extension set by the transport when the body outgrew its buffer.
///
/// The body of such a request is empty; [`crate::BodyLimitMiddleware`]
/// rejects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyLimitExceeded;

/// Extension trait for building plain responses.
pub trait ResponseExt {
    /// A `text/plain` response carrying `message`.
    fn error(status: StatusCode, message: &str) -> Response;

    /// A response with the given content type and body.
    fn with_body(status: StatusCode, content_type: &'static str, body: Bytes) -> Response;

    /// An empty response.
    fn empty(status: StatusCode) -> Response;
}

impl ResponseExt for Response {
    fn error(status: StatusCode, message: &str) -> Response {
        Self::with_body(
            status,
            "text/plain; charset=utf-8",
            Bytes::from(message.to_string()),
        )
    }

    fn with_body(status: StatusCode, content_type: &'static str, body: Bytes) -> Response {
        let mut response = http::Response::new(Full::new(body));
        *response.status_mut() = status;
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        response
    }

    fn empty(status: StatusCode) -> Response {
        let mut response = http::Response::new(Full::new(Bytes::new()));
        *response.status_mut() = status;
        response
    }
}

/// Takes the bytes out of a buffered body.
pub async fn body_bytes(body: Full<Bytes>) -> Bytes {
    match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(never) => match never {},
    }
}
