//! Ordered route table.
//!
//! Routes are tried in insertion order and the first pattern that accepts
//! the method and path wins. Grammars must not overlap under that policy;
//! nothing checks this at runtime.

use crate::params::Params;
use crate::pattern::Pattern;
use http::Method;

/// A matched route with its captured parameters.
///
/// Returned by [`Router::route`].
#[derive(Debug)]
pub struct RouteMatch<'a, H> {
    handler: &'a H,
    params: Params,
}

impl<'a, H> RouteMatch<'a, H> {
    /// The handler registered for the route.
    #[must_use]
    pub fn handler(&self) -> &'a H {
        self.handler
    }

    /// All captured parameters.
    #[must_use]
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Returns a single captured parameter.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    /// Splits the match into its handler and parameters.
    #[must_use]
    pub fn into_parts(self) -> (&'a H, Params) {
        (self.handler, self.params)
    }
}

#[derive(Debug)]
struct Route<H> {
    pattern: Pattern,
    handler: H,
}

/// HTTP request router over regex patterns.
///
/// The table is built once at startup and only read afterwards, so a router
/// can be shared between connection tasks without locking.
///
/// # Example
///
/// ```rust
/// use dsc_router::{Pattern, Router};
/// use http::Method;
///
/// let mut router = Router::new();
/// router.add(Pattern::get("status").unwrap(), 1);
/// router.add(Pattern::new("status").unwrap(), 2);
///
/// assert_eq!(*router.route(&Method::GET, "/status").unwrap().handler(), 1);
/// assert_eq!(*router.route(&Method::PUT, "/status").unwrap().handler(), 2);
/// assert!(router.route(&Method::GET, "/missing").is_none());
/// ```
#[derive(Debug)]
pub struct Router<H> {
    routes: Vec<Route<H>>,
}

impl<H> Router<H> {
    /// Creates an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Appends a route. Later routes only see requests earlier ones reject.
    pub fn add(&mut self, pattern: Pattern, handler: H) -> &mut Self {
        self.routes.push(Route { pattern, handler });
        self
    }

    /// Returns the number of registered routes.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Finds the first route accepting `method` and `path`.
    #[must_use]
    pub fn route(&self, method: &Method, path: &str) -> Option<RouteMatch<'_, H>> {
        self.routes.iter().find_map(|route| {
            route
                .pattern
                .matches(method, path)
                .map(|params| RouteMatch {
                    handler: &route.handler,
                    params,
                })
        })
    }
}

impl<H> Default for Router<H> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> Router<&'static str> {
        let mut router = Router::new();
        router
            .add(Pattern::get(r"items\((?P<id>[0-9]+)\)").unwrap(), "getItem")
            .add(Pattern::put(r"items\((?P<id>[0-9]+)\)").unwrap(), "putItem")
            .add(Pattern::new(r"items\((?P<key>[a-z]+)\)").unwrap(), "byKey");
        router
    }

    #[test]
    fn test_router_new() {
        let router: Router<()> = Router::new();
        assert_eq!(router.route_count(), 0);
        assert!(router.route(&Method::GET, "/").is_none());
    }

    #[test]
    fn test_router_method_selects_route() {
        let router = router();
        let get = router.route(&Method::GET, "/items(42)").unwrap();
        assert_eq!(*get.handler(), "getItem");
        assert_eq!(get.param("id"), Some("42"));

        let put = router.route(&Method::PUT, "/items(42)").unwrap();
        assert_eq!(*put.handler(), "putItem");
    }

    #[test]
    fn test_router_falls_through_in_order() {
        let router = router();
        let found = router.route(&Method::DELETE, "/items(abc)").unwrap();
        let (handler, params) = found.into_parts();
        assert_eq!(*handler, "byKey");
        assert_eq!(params.get("key"), Some("abc"));
        assert_eq!(params.get("id"), None);
    }

    #[test]
    fn test_router_no_match() {
        let router = router();
        assert!(router.route(&Method::DELETE, "/items(42)").is_none());
        assert!(router.route(&Method::GET, "/items(42)/extra").is_none());
    }
}
