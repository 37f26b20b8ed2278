//! Protocol translation.
//!
//! Each handler turns a routed request into a typed collaborator call and the
//! result back into the exact HTTP answer the agent expects. Nothing here
//! touches storage directly.

use bytes::{BufMut, Bytes, BytesMut};
use dsc_core::wire::{GetDscActionRequestBody, RegisterDscAgentRequestBody, SendReportRequestBody};
use dsc_core::{
    is_configuration_name, Artifact, ConfigurationRepository, DscError, ErrorCategory, GetConfigurationRequest,
    GetDscActionRequest, GetModuleRequest, GetReportsRequest, NodeStatus,
    RegisterDscAgentRequest, ReportServer, SendReportRequest,
};
use dsc_middleware::{body_bytes, Request, Response, ResponseExt};
use dsc_router::Params;
use http::header::{HeaderName, HeaderValue};
use http::StatusCode;
use regex::Regex;
use serde::Serialize;
use serde_json::value::RawValue;
use std::sync::Arc;

// Header names go out lower-cased; agents compare them case-insensitively.

/// Content checksum header on configuration and module downloads.
pub const CHECKSUM_HEADER: HeaderName = HeaderName::from_static("checksum");

/// Checksum algorithm header on configuration and module downloads.
pub const CHECKSUM_ALGORITHM_HEADER: HeaderName = HeaderName::from_static("checksumalgorithm");

/// Header naming the agent on module downloads.
pub const AGENT_ID_HEADER: HeaderName = HeaderName::from_static("agentid");

const OCTET_STREAM: &str = "application/octet-stream";
const JSON_UTF8: &str = "application/json;charset=utf-8";
const JSON: &str = "application/json";

/// Registration types the agent sends in `RegistrationMessageType`.
const CONFIGURATION_REPOSITORY: &str = "ConfigurationRepository";
const REPORT_SERVER: &str = "ReportServer";

/// What a matched route is answered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Download a configuration document.
    GetConfiguration,
    /// Download a module archive.
    GetModule,
    /// Decide the agent's next action.
    GetDscAction,
    /// Register an agent.
    RegisterDscAgent,
    /// Store a status report.
    SendReport,
    /// Return a stored status report.
    GetReports,
    /// Recognised but unimplemented (version 1 and certificate rotation).
    NotSupported,
}

/// The collaborators behind the handlers.
pub(crate) struct Endpoints {
    repository: Arc<dyn ConfigurationRepository>,
    reports: Arc<dyn ReportServer>,
    status: Arc<dyn NodeStatus>,
    agent_id: Regex,
    job_id: Regex,
}

impl Endpoints {
    pub(crate) fn new(
        repository: Arc<dyn ConfigurationRepository>,
        reports: Arc<dyn ReportServer>,
        status: Arc<dyn NodeStatus>,
        agent_id: Regex,
        job_id: Regex,
    ) -> Self {
        Self {
            repository,
            reports,
            status,
            agent_id,
            job_id,
        }
    }

    pub(crate) async fn dispatch(
        &self,
        endpoint: Endpoint,
        params: &Params,
        request: Request,
    ) -> Response {
        match endpoint {
            Endpoint::GetConfiguration => self.get_configuration(params).await,
            Endpoint::GetModule => self.get_module(params, &request).await,
            Endpoint::GetDscAction => self.get_dsc_action(params, request).await,
            Endpoint::RegisterDscAgent => self.register_dsc_agent(params, request).await,
            Endpoint::SendReport => self.send_report(params, request).await,
            Endpoint::GetReports => self.get_reports(params).await,
            Endpoint::NotSupported => not_supported(),
        }
    }

    async fn register_dsc_agent(&self, params: &Params, request: Request) -> Response {
        let raw = body_bytes(request.into_body()).await;
        let body: RegisterDscAgentRequestBody = match serde_json::from_slice(&raw) {
            Ok(body) => body,
            Err(error) => return decode_error(&error),
        };

        let agent_id = params.value("agent_id");
        let registration_type = body.message_type().to_string();
        tracing::debug!(
            registration_type = %registration_type,
            agent_id = %agent_id,
            configuration_names = ?body.configuration_names,
            "registering new agent"
        );

        let registration = RegisterDscAgentRequest {
            agent_id: agent_id.to_string(),
            body,
        };

        // Agents register once per role.
        let result = match registration_type.as_str() {
            CONFIGURATION_REPOSITORY => {
                let names = &registration.body.configuration_names;
                if let Some(name) = names.iter().find(|name| !is_configuration_name(name)) {
                    return Response::error(
                        StatusCode::BAD_REQUEST,
                        &format!("invalid configuration name: {name}"),
                    );
                }
                match self.repository.register_agent(&registration).await {
                    Ok(()) => self.status.register_agent(&registration).await,
                    Err(error) => Err(error),
                }
            }
            REPORT_SERVER => self.reports.register_agent(&registration).await,
            other => {
                return Response::error(
                    StatusCode::BAD_REQUEST,
                    &format!("unknown registration type: {other}"),
                );
            }
        };

        match result {
            Ok(()) => Response::empty(StatusCode::NO_CONTENT),
            Err(error) => {
                tracing::error!(agent_id = %agent_id, error = %error, "error registering agent");
                Response::error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &format!("error registering agent: {error}"),
                )
            }
        }
    }

    async fn get_configuration(&self, params: &Params) -> Response {
        let request = GetConfigurationRequest::new(
            params.value("agent_id"),
            params.value("configuration_name"),
        );
        tracing::debug!(
            agent_id = %request.agent_id,
            configuration_name = %request.configuration_name,
            "getting configuration"
        );

        match self.repository.get_configuration(&request).await {
            Ok(artifact) => artifact_response(artifact),
            Err(error) if error.is_not_found() => not_found(&error),
            Err(error) => {
                tracing::error!(error = %error, "error getting configuration");
                Response::error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &format!("error getting configuration: {error}"),
                )
            }
        }
    }

    async fn get_module(&self, params: &Params, request: &Request) -> Response {
        let agent_id = request
            .headers()
            .get(&AGENT_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        if !self.agent_id.is_match(agent_id) {
            return Response::error(StatusCode::BAD_REQUEST, "invalid agent id");
        }

        let request = GetModuleRequest::new(
            agent_id,
            params.value("module_name"),
            params.value("module_version"),
        );
        tracing::debug!(
            agent_id = %request.agent_id,
            module_name = %request.name,
            module_version = %request.version,
            "getting module"
        );

        match self.repository.get_module(&request).await {
            Ok(artifact) => artifact_response(artifact),
            Err(error) if error.is_not_found() => not_found(&error),
            Err(error) => {
                tracing::error!(error = %error, "error getting module");
                Response::error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &format!("error getting module: {error}"),
                )
            }
        }
    }

    async fn get_dsc_action(&self, params: &Params, request: Request) -> Response {
        let raw = body_bytes(request.into_body()).await;
        let body: GetDscActionRequestBody = match serde_json::from_slice(&raw) {
            Ok(body) => body,
            Err(error) => return decode_error(&error),
        };

        let agent_id = params.value("agent_id");
        tracing::info!(agent_id = %agent_id, body = ?body, "getting action for client");

        let request = GetDscActionRequest {
            agent_id: agent_id.to_string(),
            body,
        };
        let action = match self
            .status
            .get_dsc_action(self.repository.as_ref(), &request)
            .await
        {
            Ok(action) => action,
            Err(DscError::AgentNotRegistered { agent_id }) => {
                // A 400 makes the agent register again.
                return Response::with_body(
                    StatusCode::BAD_REQUEST,
                    JSON,
                    Bytes::from(format!("agent not registered: {agent_id}")),
                );
            }
            Err(error) if error.category() == ErrorCategory::Validation => {
                return Response::error(StatusCode::BAD_REQUEST, &error.to_string());
            }
            Err(error) => {
                tracing::error!(agent_id = %agent_id, error = %error, "error getting status");
                return Response::error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &format!("error getting status: {error}"),
                );
            }
        };

        for detail in &action.details {
            tracing::debug!(
                agent_id = %agent_id,
                configuration_name = %detail.configuration_name,
                status = %detail.status.as_str(),
                node_status = %action.node_status.as_str(),
                "replying with DSC action"
            );
        }

        json_response(StatusCode::OK, JSON_UTF8, &action)
    }

    async fn send_report(&self, params: &Params, request: Request) -> Response {
        let raw = body_bytes(request.into_body()).await;
        let body: SendReportRequestBody = match serde_json::from_slice(&raw) {
            Ok(body) => body,
            Err(error) => return decode_error(&error),
        };

        if !self.job_id.is_match(&body.job_id) {
            return Response::error(StatusCode::BAD_REQUEST, "invalid job id");
        }

        let agent_id = params.value("agent_id");
        match body.normalized() {
            Ok(report) => tracing::debug!(
                agent_id = %agent_id,
                job_id = %report.job_id,
                operation_type = %report.operation_type,
                status = %report.status,
                node_name = %report.node_name,
                start_time = ?report.start_time,
                end_time = ?report.end_time,
                reboot_requested = ?report.reboot_requested,
                errors = report.errors.len(),
                "received report"
            ),
            Err(error) => tracing::warn!(
                agent_id = %agent_id,
                job_id = %body.job_id,
                error = %error,
                "report has malformed fields"
            ),
        }

        let request = SendReportRequest {
            agent_id: agent_id.to_string(),
            body,
            raw,
        };
        match self.reports.send_report(&request).await {
            Ok(()) => Response::with_body(
                StatusCode::OK,
                JSON_UTF8,
                Bytes::from_static(br#"{"value":"SavedReport"}"#),
            ),
            Err(error) => {
                tracing::error!(agent_id = %agent_id, error = %error, "error saving report");
                Response::error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &format!("error saving report: {error}"),
                )
            }
        }
    }

    async fn get_reports(&self, params: &Params) -> Response {
        let request = GetReportsRequest::new(params.value("agent_id"), params.value("job_id"));

        let stored = match self.reports.get_report(&request).await {
            Ok(stored) => stored,
            Err(error) if error.is_not_found() => return not_found(&error),
            Err(error) => {
                tracing::error!(error = %error, "error getting report");
                return Response::error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &format!("error getting report: {error}"),
                );
            }
        };

        // Stored reports are already JSON; embed them without re-encoding.
        let report: &RawValue = match serde_json::from_slice(&stored) {
            Ok(report) => report,
            Err(error) => {
                tracing::error!(error = %error, "stored report is not valid JSON");
                return Response::error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &format!("error getting report: {error}"),
                );
            }
        };

        json_response(StatusCode::OK, JSON, &ReportsResponse { value: [report] })
    }
}

#[derive(Serialize)]
struct ReportsResponse<'a> {
    value: [&'a RawValue; 1],
}

/// Answer for routes that are recognised but not implemented.
pub(crate) fn not_supported() -> Response {
    Response::error(StatusCode::NOT_IMPLEMENTED, "method not supported")
}

/// Answer for requests no route accepts.
pub(crate) fn page_not_found() -> Response {
    Response::error(StatusCode::NOT_FOUND, "404 page not found")
}

fn not_found(error: &DscError) -> Response {
    Response::error(StatusCode::NOT_FOUND, &error.to_string())
}

fn decode_error(error: &serde_json::Error) -> Response {
    Response::error(
        StatusCode::BAD_REQUEST,
        &format!("error decoding body: {error}"),
    )
}

fn artifact_response(artifact: Artifact) -> Response {
    let headers = (
        HeaderValue::try_from(artifact.checksum.as_str()),
        HeaderValue::try_from(artifact.checksum_algorithm.as_str()),
    );
    let (Ok(checksum), Ok(algorithm)) = headers else {
        tracing::error!(checksum = %artifact.checksum, "checksum is not a valid header value");
        return Response::error(StatusCode::INTERNAL_SERVER_ERROR, "invalid checksum");
    };

    let mut response = Response::with_body(StatusCode::OK, OCTET_STREAM, artifact.content);
    response.headers_mut().insert(CHECKSUM_HEADER, checksum);
    response
        .headers_mut()
        .insert(CHECKSUM_ALGORITHM_HEADER, algorithm);
    response
}

/// Encodes `value` followed by a newline.
fn json_response<T: Serialize>(status: StatusCode, content_type: &'static str, value: &T) -> Response {
    let mut buffer = BytesMut::new().writer();
    if let Err(error) = serde_json::to_writer(&mut buffer, value) {
        tracing::error!(error = %error, "error encoding response");
        return Response::error(StatusCode::INTERNAL_SERVER_ERROR, "error encoding response");
    }

    let mut body = buffer.into_inner();
    body.put_u8(b'\n');
    Response::with_body(status, content_type, body.freeze())
}
