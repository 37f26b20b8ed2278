//! Ordered middleware pipeline.
//!
//! The pipeline wraps the protocol handler in its stages, first stage
//! outermost. A stage that short-circuits hides the request from every stage
//! after it, so the order is part of the protocol: an unsupported protocol
//! version is reported before an oversized body, and both before a bad
//! signature.
//!
//! ## Stages
//!
//! 1. **Protocol version** - require `ProtocolVersion: 2.0`
//! 2. **Body limit** - reject oversized bodies
//! 3. **Request log** - log start and completion
//! 4. **Shared-key auth** - verify the HMAC signature (optional)

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{Request, Response};
use std::sync::Arc;

/// A type-erased middleware that can be stored in a vector.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// An immutable chain of middleware stages.
///
/// # Example
///
/// ```ignore
/// use dsc_middleware::{BodyLimitMiddleware, Pipeline, ProtocolVersionMiddleware};
///
/// let pipeline = Pipeline::builder()
///     .add_stage(ProtocolVersionMiddleware::new())
///     .add_stage(BodyLimitMiddleware::default())
///     .build();
///
/// let response = pipeline.process(ctx, request, handler).await;
/// ```
#[derive(Clone)]
pub struct Pipeline {
    stages: Vec<BoxedMiddleware>,
}

impl Pipeline {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Runs `request` through every stage and then `handler`.
    pub async fn process<H>(
        &self,
        mut ctx: MiddlewareContext,
        request: Request,
        handler: H,
    ) -> Response
    where
        H: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, Response> + Send + 'static,
    {
        let next = self.build_chain(handler);
        next.run(&mut ctx, request).await
    }

    fn build_chain<'a, H>(&'a self, handler: H) -> Next<'a>
    where
        H: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, Response> + Send + 'a,
    {
        self.stages
            .iter()
            .rev()
            .fold(Next::handler(handler), |next, middleware| {
                Next::new(middleware.as_ref(), next)
            })
    }

    /// Returns the names of all stages in order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}

/// Builder for constructing a [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    stages: Vec<BoxedMiddleware>,
}

impl PipelineBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a stage. Stages run in the order they are added.
    #[must_use]
    pub fn add_stage<M: Middleware>(mut self, middleware: M) -> Self {
        self.stages.push(Arc::new(middleware));
        self
    }

    /// Appends a stage if `middleware` is `Some`.
    #[must_use]
    pub fn add_optional_stage<M: Middleware>(self, middleware: Option<M>) -> Self {
        match middleware {
            Some(middleware) => self.add_stage(middleware),
            None => self,
        }
    }

    /// Builds the pipeline.
    #[must_use]
    pub fn build(self) -> Pipeline {
        Pipeline {
            stages: self.stages,
        }
    }
}

/// The pull server's stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Stage {
    /// Stage 1: protocol version check
    ProtocolVersion = 1,
    /// Stage 2: request body size limit
    BodyLimit = 2,
    /// Stage 3: request logging
    RequestLog = 3,
    /// Stage 4: shared-key signature check
    SharedKeyAuth = 4,
}

impl Stage {
    /// Returns the stage name, matching [`Middleware::name`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ProtocolVersion => "protocol_version",
            Self::BodyLimit => "body_limit",
            Self::RequestLog => "request_log",
            Self::SharedKeyAuth => "shared_key_auth",
        }
    }

    /// Returns true if the stage can be left out of a pipeline.
    #[must_use]
    pub const fn is_optional(self) -> bool {
        matches!(self, Self::SharedKeyAuth)
    }

    /// Returns all stages in order.
    #[must_use]
    pub const fn all() -> [Stage; 4] {
        [
            Self::ProtocolVersion,
            Self::BodyLimit,
            Self::RequestLog,
            Self::SharedKeyAuth,
        ]
    }
}
