//! Shared registration-key authentication.
//!
//! Agents sign every request with one of the server's registration keys:
//!
//! ```text
//! body_hash      = base64(sha256(body))
//! string_to_sign = body_hash + "\n" + x-ms-date
//! Authorization  = "Shared " + base64(hmac_sha256(key, string_to_sign))
//! ```
//!
//! The stage accepts a request when the signature matches any configured key.
//! Missing headers are a 400; a signature that matches no key is a 401.

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{body_bytes, Request, Response, ResponseExt};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use http::header::AUTHORIZATION;
use http::StatusCode;
use http_body_util::Full;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the signing timestamp.
pub const DATE_HEADER: &str = "x-ms-date";

const SCHEME_PREFIX: &str = "Shared ";

/// Context extension recording which key verified the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedKey {
    /// Position of the key in the configured key list.
    pub index: usize,
}

/// Builds the string an agent signs.
#[must_use]
pub fn string_to_sign(body: &[u8], date: &str) -> String {
    format!("{}\n{date}", STANDARD.encode(Sha256::digest(body)))
}

/// Computes the base64 signature of `body` and `date` under `key`.
///
/// Returns `None` only if the key cannot seed an HMAC.
#[must_use]
pub fn sign(key: &str, body: &[u8], date: &str) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(key.as_bytes()).ok()?;
    mac.update(string_to_sign(body, date).as_bytes());
    Some(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Checks `signature` against every key, returning the index of the first
/// key that produced it.
///
/// `signature` is the `Authorization` value with the `Shared ` prefix
/// already removed.
#[must_use]
pub fn verify<K: AsRef<str>>(body: &[u8], date: &str, signature: &str, keys: &[K]) -> Option<usize> {
    keys.iter().position(|key| {
        sign(key.as_ref(), body, date)
            .is_some_and(|expected| bool::from(expected.as_bytes().ct_eq(signature.as_bytes())))
    })
}

/// Middleware that verifies shared-key request signatures.
#[derive(Clone)]
pub struct SharedKeyMiddleware {
    keys: Vec<String>,
}

impl SharedKeyMiddleware {
    /// Creates the middleware for a list of registration keys.
    #[must_use]
    pub fn new(keys: Vec<String>) -> Self {
        Self { keys }
    }

    /// Returns a middleware only if there is at least one key.
    #[must_use]
    pub fn from_keys(keys: &[String]) -> Option<Self> {
        if keys.is_empty() {
            None
        } else {
            Some(Self::new(keys.to_vec()))
        }
    }
}

impl std::fmt::Debug for SharedKeyMiddleware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedKeyMiddleware")
            .field("keys", &format_args!("[{} redacted]", self.keys.len()))
            .finish()
    }
}

fn header<'r>(request: &'r Request, name: impl http::header::AsHeaderName) -> Option<&'r str> {
    request
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
}

impl Middleware for SharedKeyMiddleware {
    fn name(&self) -> &'static str {
        "shared_key_auth"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let Some(date) = header(&request, DATE_HEADER).map(str::to_owned) else {
                return Response::error(StatusCode::BAD_REQUEST, r#"missing "x-ms-date" header"#);
            };
            let Some(authorization) = header(&request, AUTHORIZATION).map(str::to_owned) else {
                return Response::error(
                    StatusCode::BAD_REQUEST,
                    r#"missing "Authorization" header"#,
                );
            };
            let signature = authorization
                .strip_prefix(SCHEME_PREFIX)
                .unwrap_or(&authorization);

            let (parts, body) = request.into_parts();
            let body = body_bytes(body).await;

            let Some(index) = verify(&body, &date, signature, &self.keys) else {
                tracing::warn!(
                    request_id = %ctx.request_id(),
                    "rejected request with bad shared-key signature"
                );
                return Response::error(StatusCode::UNAUTHORIZED, "bad signature on request");
            };

            ctx.set_extension(AuthenticatedKey { index });
            next.run(ctx, Request::from_parts(parts, Full::new(body)))
                .await
        })
    }
}
