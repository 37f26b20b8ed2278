//! The protocol engine behind the server.
//!
//! A [`Manager`] owns the ordered route table, the middleware pipeline and
//! the three storage collaborators. It is transport-agnostic: hand it a
//! buffered request and it returns the response.

use crate::error::ServerError;
use crate::handlers::{page_not_found, Endpoint, Endpoints};
use dsc_core::{ConfigurationRepository, NodeStatus, ReportServer};
use dsc_middleware::stages::DEFAULT_MAX_BODY_SIZE;
use dsc_middleware::{
    BodyLimitMiddleware, BoxFuture, MiddlewareContext, Pipeline, ProtocolVersionMiddleware, Request,
    RequestLogMiddleware, Response, SharedKeyMiddleware,
};
use dsc_router::{grammar, urls, Pattern, Router};
use regex::Regex;
use std::sync::Arc;

/// Routes requests through the middleware pipeline to the protocol handlers.
///
/// # Example
///
/// ```rust,ignore
/// use dsc_server::Manager;
/// use dsc_store::{LocalConfigurationRepository, MemoryNodeStatus, MemoryReportServer};
/// use std::sync::Arc;
///
/// let manager = Manager::builder(
///     Arc::new(LocalConfigurationRepository::new("test/config")),
///     Arc::new(MemoryReportServer::new()),
///     Arc::new(MemoryNodeStatus::new()),
/// )
/// .registration_keys(vec!["f65e1a0c-46b0-424c-a6a5-c3701aef32e5".into()])
/// .build()?;
/// ```
pub struct Manager {
    router: Router<Endpoint>,
    pipeline: Pipeline,
    endpoints: Arc<Endpoints>,
}

impl Manager {
    /// Starts building a manager over the given collaborators.
    pub fn builder(
        repository: Arc<dyn ConfigurationRepository>,
        reports: Arc<dyn ReportServer>,
        status: Arc<dyn NodeStatus>,
    ) -> ManagerBuilder {
        ManagerBuilder {
            repository,
            reports,
            status,
            keys: Vec::new(),
            max_body_bytes: DEFAULT_MAX_BODY_SIZE,
        }
    }

    /// Handles one request.
    ///
    /// The route is resolved up front but the handler only runs if every
    /// middleware stage lets the request through. Unmatched requests still
    /// pass the pipeline and are answered with 404.
    pub async fn handle(&self, ctx: MiddlewareContext, request: Request) -> Response {
        let target = self
            .router
            .route(request.method(), request.uri().path())
            .map(|found| {
                let (endpoint, params) = found.into_parts();
                (*endpoint, params)
            });
        let endpoints = Arc::clone(&self.endpoints);

        let handler = move |_ctx: &mut MiddlewareContext, request: Request| -> BoxFuture<'static, Response> {
            Box::pin(async move {
                match target {
                    Some((endpoint, params)) => endpoints.dispatch(endpoint, &params, request).await,
                    None => page_not_found(),
                }
            })
        };

        self.pipeline.process(ctx, request, handler).await
    }

    /// Middleware stage names in execution order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.pipeline.stage_names()
    }

    /// Number of registered routes.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.router.route_count()
    }
}

impl std::fmt::Debug for Manager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Manager")
            .field("routes", &self.router.route_count())
            .field("pipeline", &self.pipeline)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Manager`].
pub struct ManagerBuilder {
    repository: Arc<dyn ConfigurationRepository>,
    reports: Arc<dyn ReportServer>,
    status: Arc<dyn NodeStatus>,
    keys: Vec<String>,
    max_body_bytes: u64,
}

impl ManagerBuilder {
    /// Registration keys for shared-key request signing. An empty list
    /// disables signature checks.
    #[must_use]
    pub fn registration_keys(mut self, keys: Vec<String>) -> Self {
        self.keys = keys;
        self
    }

    /// Request body limit enforced by the pipeline.
    #[must_use]
    pub fn max_body_bytes(mut self, bytes: u64) -> Self {
        self.max_body_bytes = bytes;
        self
    }

    /// Compiles the route table and assembles the pipeline.
    pub fn build(self) -> Result<Manager, ServerError> {
        let pipeline = Pipeline::builder()
            .add_stage(ProtocolVersionMiddleware::new())
            .add_stage(BodyLimitMiddleware::new(self.max_body_bytes))
            .add_stage(RequestLogMiddleware::new())
            .add_optional_stage(SharedKeyMiddleware::from_keys(&self.keys))
            .build();

        Ok(Manager {
            router: route_table()?,
            pipeline,
            endpoints: Arc::new(Endpoints::new(
                self.repository,
                self.reports,
                self.status,
                whole(grammar::AGENT_ID)?,
                whole(grammar::JOB_ID)?,
            )),
        })
    }
}

/// Compiles `grammar` to match an entire identifier.
fn whole(grammar: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{grammar})$"))
}

/// The protocol's route table. Order matters: the first match wins.
fn route_table() -> Result<Router<Endpoint>, ServerError> {
    let mut router = Router::new();
    router
        // Version 1.0 and 1.1 are recognised but not served.
        .add(Pattern::get(&urls::get_configuration_v1())?, Endpoint::NotSupported)
        .add(Pattern::get(&urls::get_module_v1())?, Endpoint::NotSupported)
        .add(Pattern::post(&urls::get_action_v1())?, Endpoint::NotSupported)
        .add(Pattern::post(&urls::send_status_report_v1())?, Endpoint::NotSupported)
        .add(Pattern::get(&urls::get_status_report_v1())?, Endpoint::NotSupported)
        .add(Pattern::get(&urls::get_configuration_v2())?, Endpoint::GetConfiguration)
        .add(Pattern::get(&urls::get_module_v2())?, Endpoint::GetModule)
        .add(Pattern::post(&urls::get_dsc_action_v2())?, Endpoint::GetDscAction)
        .add(Pattern::put(&urls::register_dsc_agent_v2())?, Endpoint::RegisterDscAgent)
        .add(Pattern::post(&urls::send_report_v2())?, Endpoint::SendReport)
        .add(Pattern::get(&urls::get_reports_v2())?, Endpoint::GetReports)
        .add(Pattern::post(&urls::certificate_rotation())?, Endpoint::NotSupported);
    Ok(router)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    const AGENT: &str = "B1F28971-2CEB-46D5-9DCB-79C044395F81";

    fn endpoint(method: Method, path: &str) -> Option<Endpoint> {
        route_table()
            .unwrap()
            .route(&method, path)
            .map(|found| *found.handler())
    }

    #[test]
    fn test_route_table_size() {
        assert_eq!(route_table().unwrap().route_count(), 12);
    }

    #[test]
    fn test_v2_routes() {
        assert_eq!(
            endpoint(Method::PUT, &format!("/Nodes(AgentId='{AGENT}')")),
            Some(Endpoint::RegisterDscAgent)
        );
        assert_eq!(
            endpoint(Method::POST, &format!("/Nodes(AgentId='{AGENT}')/GetDscAction")),
            Some(Endpoint::GetDscAction)
        );
        assert_eq!(
            endpoint(
                Method::GET,
                &format!("/Nodes(AgentId='{AGENT}')/Configurations(ConfigurationName='Web')/ConfigurationContent")
            ),
            Some(Endpoint::GetConfiguration)
        );
        assert_eq!(
            endpoint(
                Method::GET,
                "/Modules(ModuleName='xPSDesiredStateConfiguration',ModuleVersion='3.0.3.4')/ModuleContent"
            ),
            Some(Endpoint::GetModule)
        );
        assert_eq!(
            endpoint(Method::POST, &format!("/Nodes(AgentId='{AGENT}')/SendReport")),
            Some(Endpoint::SendReport)
        );
        assert_eq!(
            endpoint(
                Method::GET,
                &format!("/Nodes(AgentId='{AGENT}')/Reports(JobId='{AGENT}')")
            ),
            Some(Endpoint::GetReports)
        );
    }

    #[test]
    fn test_unsupported_routes() {
        for (method, path) in [
            (Method::GET, format!("/Action(ConfigurationId='{AGENT}')/ConfigurationContent")),
            (Method::POST, format!("/Action(ConfigurationId='{AGENT}')/GetAction")),
            (Method::POST, format!("/Node(ConfigurationId='{AGENT}')/SendStatusReport")),
            (Method::POST, format!("/Nodes(AgentId='{AGENT}')/CertificateRotation")),
        ] {
            assert_eq!(endpoint(method, &path), Some(Endpoint::NotSupported), "{path}");
        }
    }

    #[test]
    fn test_wrong_method_is_unmatched() {
        assert_eq!(endpoint(Method::GET, &format!("/Nodes(AgentId='{AGENT}')")), None);
        assert_eq!(
            endpoint(Method::GET, &format!("/Nodes(AgentId='{AGENT}')/SendReport")),
            None
        );
    }
}
