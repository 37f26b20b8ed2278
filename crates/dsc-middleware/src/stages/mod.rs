//! Pipeline stages of the pull server.
//!
//! 1. [`protocol_version`] - require `ProtocolVersion: 2.0`
//! 2. [`body_limit`] - cap the request body
//! 3. [`request_log`] - log every request
//! 4. [`shared_key`] - verify the registration-key signature

pub mod body_limit;
pub mod protocol_version;
pub mod request_log;
pub mod shared_key;

pub use body_limit::{BodyLimitMiddleware, DEFAULT_MAX_BODY_SIZE};
pub use protocol_version::{ProtocolVersionMiddleware, PROTOCOL_VERSION_HEADER};
pub use request_log::RequestLogMiddleware;
pub use shared_key::{AuthenticatedKey, SharedKeyMiddleware, DATE_HEADER};
