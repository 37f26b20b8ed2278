//! JSON bodies exchanged with agents.
//!
//! Field names follow the protocol's own spelling (`LCMVersion`, `IPAddress`,
//! `IpAddress` and so on), so every field is renamed explicitly rather than
//! through a blanket `rename_all`. Unknown fields are ignored on input.

mod report;

pub use report::{NormalizedReport, ReportFormatError, SendReportRequestBody, ZonedIpAddr};

use serde::{Deserialize, Deserializer, Serialize};

/// Action the server instructs an agent to take, per configuration and for
/// the node as a whole.
///
/// `UpdateMetaConfiguration` and `Retry` are part of the protocol vocabulary
/// but the reconciliation engine never produces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    /// The agent is running the expected configuration.
    #[serde(rename = "OK")]
    Ok,
    /// The agent must download the configuration again.
    GetConfiguration,
    /// The agent must refresh its meta-configuration.
    UpdateMetaConfiguration,
    /// The agent should ask again later.
    Retry,
}

impl Verdict {
    /// Protocol spelling of the verdict.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::GetConfiguration => "GetConfiguration",
            Self::UpdateMetaConfiguration => "UpdateMetaConfiguration",
            Self::Retry => "Retry",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reads an explicit `null` as the type's default, same as an absent field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Body of a `GetDscAction` request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetDscActionRequestBody {
    /// Checksum claims for the configurations the agent currently runs.
    #[serde(
        rename = "ClientStatus",
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub client_status: Vec<ClientStatusItem>,
}

/// One checksum claim sent by an agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientStatusItem {
    /// Checksum of the applied configuration; empty before the first check.
    #[serde(
        rename = "Checksum",
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub checksum: String,
    /// Algorithm the checksum was computed with.
    #[serde(
        rename = "ChecksumAlgorithm",
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub checksum_algorithm: String,
    /// Name of the partial configuration; empty for non-partial agents.
    #[serde(
        rename = "ConfigurationName",
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub configuration_name: String,
}

impl ClientStatusItem {
    /// Builds a claim.
    pub fn new(checksum: impl Into<String>, configuration_name: impl Into<String>) -> Self {
        Self {
            checksum: checksum.into(),
            checksum_algorithm: crate::CHECKSUM_ALGORITHM.to_string(),
            configuration_name: configuration_name.into(),
        }
    }
}

/// Body of a `GetDscAction` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetDscActionResponseBody {
    /// Per-configuration verdicts.
    #[serde(
        rename = "Details",
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub details: Vec<ActionDetail>,
    /// Aggregate verdict for the node.
    #[serde(rename = "NodeStatus")]
    pub node_status: Verdict,
}

/// Verdict for one configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDetail {
    /// Configuration the verdict applies to.
    #[serde(rename = "ConfigurationName", default, deserialize_with = "null_as_default")]
    pub configuration_name: String,
    /// The verdict.
    #[serde(rename = "Status")]
    pub status: Verdict,
}

impl ActionDetail {
    /// Builds a detail entry.
    pub fn new(configuration_name: impl Into<String>, status: Verdict) -> Self {
        Self {
            configuration_name: configuration_name.into(),
            status,
        }
    }
}

/// Body of a `RegisterDscAgent` request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterDscAgentRequestBody {
    /// Information about the agent.
    #[serde(rename = "AgentInformation", default, deserialize_with = "null_as_default")]
    pub agent_information: AgentInformation,
    /// Configurations the agent intends to run, in order.
    #[serde(
        rename = "ConfigurationNames",
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub configuration_names: Vec<String>,
    /// Registration kind and client certificate.
    #[serde(
        rename = "RegistrationInformation",
        default,
        deserialize_with = "null_as_default"
    )]
    pub registration_information: RegistrationInformation,
}

impl RegisterDscAgentRequestBody {
    /// The registration message type, or an empty string when absent.
    #[must_use]
    pub fn message_type(&self) -> &str {
        self.registration_information
            .registration_message_type
            .as_deref()
            .unwrap_or_default()
    }
}

/// Agent description sent during registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentInformation {
    /// Semicolon-separated IP addresses.
    #[serde(rename = "IPAddress", default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    /// Local configuration manager version.
    #[serde(rename = "LCMVersion", default, skip_serializing_if = "Option::is_none")]
    pub lcm_version: Option<String>,
    /// Host name of the node.
    #[serde(rename = "NodeName", default, skip_serializing_if = "Option::is_none")]
    pub node_name: Option<String>,
}

/// Registration kind and certificate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationInformation {
    /// `ConfigurationRepository` or `ReportServer`.
    #[serde(
        rename = "RegistrationMessageType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub registration_message_type: Option<String>,
    /// Client certificate description.
    #[serde(
        rename = "CertificateInformation",
        default,
        deserialize_with = "null_as_default"
    )]
    pub certificate_information: CertificateInformation,
}

/// Client certificate description.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateInformation {
    #[serde(rename = "FriendlyName", default, skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<String>,
    #[serde(rename = "Issuer", default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(rename = "NotAfter", default, skip_serializing_if = "Option::is_none")]
    pub not_after: Option<String>,
    #[serde(rename = "NotBefore", default, skip_serializing_if = "Option::is_none")]
    pub not_before: Option<String>,
    #[serde(rename = "PublicKey", default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    #[serde(rename = "Subject", default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(rename = "Thumbprint", default, skip_serializing_if = "Option::is_none")]
    pub thumbprint: Option<String>,
    #[serde(rename = "Version", default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
}
