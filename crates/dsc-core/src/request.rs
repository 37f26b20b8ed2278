//! Typed requests handed to the storage collaborators.

use crate::wire::{GetDscActionRequestBody, RegisterDscAgentRequestBody, SendReportRequestBody};
use bytes::Bytes;

/// Canonical storage key for an identifier.
///
/// Agent ids, configuration names and module specs are matched
/// case-insensitively, so every backend keys its storage on the lower-cased
/// form.
#[must_use]
pub fn canonical(id: &str) -> String {
    id.to_lowercase()
}

/// Whether `name` is a well-formed configuration name: one or more ASCII
/// letters or digits.
#[must_use]
pub fn is_configuration_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Request for a configuration document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetConfigurationRequest {
    /// Requesting agent.
    pub agent_id: String,
    /// Configuration name as sent by the agent.
    pub configuration_name: String,
}

impl GetConfigurationRequest {
    /// Builds a request.
    pub fn new(agent_id: impl Into<String>, configuration_name: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            configuration_name: configuration_name.into(),
        }
    }
}

/// Request for a module archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetModuleRequest {
    /// Requesting agent, taken from the `AgentId` header.
    pub agent_id: String,
    /// Module name.
    pub name: String,
    /// Module version, possibly empty.
    pub version: String,
}

impl GetModuleRequest {
    /// Builds a request.
    pub fn new(
        agent_id: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            name: name.into(),
            version: version.into(),
        }
    }
}

/// Request for the agent's next action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetDscActionRequest {
    /// Requesting agent.
    pub agent_id: String,
    /// Decoded checksum claims.
    pub body: GetDscActionRequestBody,
}

/// Agent registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterDscAgentRequest {
    /// Registering agent.
    pub agent_id: String,
    /// Decoded registration body.
    pub body: RegisterDscAgentRequestBody,
}

/// A status report to store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReportRequest {
    /// Reporting agent.
    pub agent_id: String,
    /// Decoded report, used for the job id.
    pub body: SendReportRequestBody,
    /// The request body exactly as received; this is what gets stored.
    pub raw: Bytes,
}

impl SendReportRequest {
    /// Job id the report is filed under.
    #[must_use]
    pub fn job_id(&self) -> &str {
        &self.body.job_id
    }
}

/// Lookup of a stored report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetReportsRequest {
    /// Agent the report belongs to.
    pub agent_id: String,
    /// Job id of the report.
    pub job_id: String,
}

impl GetReportsRequest {
    /// Builds a request.
    pub fn new(agent_id: impl Into<String>, job_id: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            job_id: job_id.into(),
        }
    }
}
