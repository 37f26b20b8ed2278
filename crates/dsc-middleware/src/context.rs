//! Per-request context carried through the pipeline.
//!
//! The context is created by the transport for every request and handed
//! mutably to each middleware stage in turn. Stages can leave typed values
//! behind for later stages or the handler via the extension map.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Request-scoped state shared by middleware stages.
///
/// # Example
///
/// ```
/// use dsc_middleware::MiddlewareContext;
///
/// #[derive(Debug, PartialEq)]
/// struct Marker(u8);
///
/// let mut ctx = MiddlewareContext::new();
/// ctx.set_extension(Marker(7));
/// assert_eq!(ctx.get_extension::<Marker>(), Some(&Marker(7)));
/// assert!(ctx.remote_addr().is_none());
/// ```
#[derive(Debug)]
pub struct MiddlewareContext {
    /// UUID v7 assigned when the request arrived.
    request_id: Uuid,

    /// Peer address of the connection, if known.
    remote_addr: Option<SocketAddr>,

    /// When the request arrived.
    started_at: Instant,

    extensions: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl MiddlewareContext {
    /// Creates a context with a fresh request id and no peer address.
    #[must_use]
    pub fn new() -> Self {
        Self {
            request_id: Uuid::now_v7(),
            remote_addr: None,
            started_at: Instant::now(),
            extensions: HashMap::new(),
        }
    }

    /// Creates a context for a request from `remote_addr`.
    #[must_use]
    pub fn with_remote_addr(remote_addr: SocketAddr) -> Self {
        Self {
            remote_addr: Some(remote_addr),
            ..Self::new()
        }
    }

    /// Returns the request id.
    #[must_use]
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Returns the peer address.
    #[must_use]
    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.remote_addr
    }

    /// Returns when the request arrived.
    #[must_use]
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Time since the request arrived.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Stores a typed value, replacing any previous value of that type.
    pub fn set_extension<T: Send + Sync + 'static>(&mut self, value: T) {
        self.extensions.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Returns the stored value of type `T`.
    #[must_use]
    pub fn get_extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }
}

impl Default for MiddlewareContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_ids_are_unique() {
        let a = MiddlewareContext::new();
        let b = MiddlewareContext::new();
        assert_ne!(a.request_id(), b.request_id());
        assert_eq!(a.request_id().get_version_num(), 7);
    }

    #[test]
    fn test_remote_addr() {
        let addr: SocketAddr = "10.50.1.9:51234".parse().unwrap();
        let ctx = MiddlewareContext::with_remote_addr(addr);
        assert_eq!(ctx.remote_addr(), Some(addr));
    }

    #[test]
    fn test_extension_replaced() {
        let mut ctx = MiddlewareContext::default();
        ctx.set_extension(1u32);
        ctx.set_extension(2u32);
        assert_eq!(ctx.get_extension::<u32>(), Some(&2));
        assert_eq!(ctx.get_extension::<u64>(), None);
    }
}
