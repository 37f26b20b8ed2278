//! # DSC Middleware
//!
//! Request middleware pipeline for the DSC pull server.
//!
//! Every request passes through the same stages, in a fixed order, before
//! the protocol handler sees it:
//!
//! ```text
//! Request → ProtocolVersion → BodyLimit → RequestLog → SharedKeyAuth → Handler
//! ```
//!
//! | Stage | Middleware | Rejects with |
//! |-------|------------|--------------|
//! | 1 | [`ProtocolVersionMiddleware`] | 501 unless `ProtocolVersion: 2.0` |
//! | 2 | [`BodyLimitMiddleware`] | 400 when the body is over the limit |
//! | 3 | [`RequestLogMiddleware`] | never |
//! | 4 | [`SharedKeyMiddleware`] | 400 missing headers, 401 bad signature |
//!
//! The shared-key stage is only installed when at least one key is
//! configured.
//!
//! ## Example
//!
//! ```
//! use dsc_middleware::pipeline::Stage;
//!
//! let stages = Stage::all();
//! assert_eq!(stages.len(), 4);
//! assert_eq!(stages[0].name(), "protocol_version");
//! assert_eq!(stages[3].name(), "shared_key_auth");
//! ```

#![doc(html_root_url = "https://docs.rs/dsc-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod context;
pub mod middleware;
pub mod pipeline;
pub mod stages;
pub mod types;

pub use context::MiddlewareContext;
pub use middleware::{BoxFuture, Middleware, Next};
pub use pipeline::{Pipeline, PipelineBuilder, Stage};
pub use stages::{
    BodyLimitMiddleware, ProtocolVersionMiddleware, RequestLogMiddleware, SharedKeyMiddleware,
};
pub use types::{body_bytes, BodyLimitExceeded, Request, Response, ResponseExt};
