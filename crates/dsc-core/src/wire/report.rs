//! Status reports pushed by agents.
//!
//! Reports are stored exactly as received; [`SendReportRequestBody`] exists to
//! pull out the job id and to offer a typed view through
//! [`SendReportRequestBody::normalized`].

use super::null_as_default;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use thiserror::Error;

/// Body of a `SendReport` request.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendReportRequestBody {
    #[serde(rename = "JobId", default, deserialize_with = "null_as_default")]
    pub job_id: String,
    #[serde(rename = "OperationType", default, deserialize_with = "null_as_default")]
    pub operation_type: String,
    #[serde(
        rename = "RefreshMode",
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub refresh_mode: String,
    #[serde(
        rename = "Status",
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub status: String,
    #[serde(
        rename = "LCMVersion",
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub lcm_version: String,
    #[serde(rename = "ReportFormatVersion", default, deserialize_with = "null_as_default")]
    pub report_format_version: String,
    #[serde(
        rename = "ConfigurationVersion",
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub configuration_version: String,
    #[serde(
        rename = "NodeName",
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub node_name: String,
    /// Semicolon-separated addresses, IPv6 entries may carry a `%zone`.
    #[serde(
        rename = "IpAddress",
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub ip_address: String,
    #[serde(
        rename = "StartTime",
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub start_time: String,
    #[serde(
        rename = "EndTime",
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub end_time: String,
    /// `True`, `False` or empty.
    #[serde(
        rename = "RebootRequested",
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub reboot_requested: String,
    #[serde(
        rename = "Errors",
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub errors: Vec<String>,
    #[serde(
        rename = "StatusData",
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub status_data: Vec<String>,
}

/// Errors raised while normalizing a report.
#[derive(Debug, Error)]
pub enum ReportFormatError {
    /// `StartTime` or `EndTime` is not RFC 3339.
    #[error("invalid {field}: {source}")]
    Timestamp {
        /// Offending field name.
        field: &'static str,
        /// Parser error.
        #[source]
        source: chrono::ParseError,
    },

    /// `RebootRequested` holds something other than a boolean spelling.
    #[error("unrecognized boolean value: {0}")]
    Boolean(String),

    /// An `IpAddress` entry does not parse.
    #[error("could not parse IP address: {0}")]
    IpAddress(String),
}

/// An IP address with its optional IPv6 zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZonedIpAddr {
    /// The address.
    pub addr: IpAddr,
    /// Zone identifier that followed `%`, if any.
    pub zone: Option<String>,
}

/// Typed view of a [`SendReportRequestBody`].
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedReport {
    pub job_id: String,
    pub operation_type: String,
    pub refresh_mode: String,
    pub status: String,
    pub lcm_version: String,
    pub report_format_version: String,
    pub configuration_version: String,
    pub node_name: String,
    pub ip_addresses: Vec<ZonedIpAddr>,
    pub start_time: Option<DateTime<FixedOffset>>,
    pub end_time: Option<DateTime<FixedOffset>>,
    pub reboot_requested: Option<bool>,
    pub errors: Vec<String>,
    pub status_data: Vec<String>,
}

impl SendReportRequestBody {
    /// Converts the textual fields into typed values.
    pub fn normalized(&self) -> Result<NormalizedReport, ReportFormatError> {
        Ok(NormalizedReport {
            job_id: self.job_id.clone(),
            operation_type: self.operation_type.clone(),
            refresh_mode: self.refresh_mode.clone(),
            status: self.status.clone(),
            lcm_version: self.lcm_version.clone(),
            report_format_version: self.report_format_version.clone(),
            configuration_version: self.configuration_version.clone(),
            node_name: self.node_name.clone(),
            ip_addresses: parse_ip_addresses(&self.ip_address)?,
            start_time: parse_timestamp("StartTime", &self.start_time)?,
            end_time: parse_timestamp("EndTime", &self.end_time)?,
            reboot_requested: parse_bool(&self.reboot_requested)?,
            errors: self.errors.clone(),
            status_data: self.status_data.clone(),
        })
    }
}

fn parse_timestamp(
    field: &'static str,
    value: &str,
) -> Result<Option<DateTime<FixedOffset>>, ReportFormatError> {
    if value.is_empty() {
        return Ok(None);
    }
    DateTime::parse_from_rfc3339(value)
        .map(Some)
        .map_err(|source| ReportFormatError::Timestamp { field, source })
}

fn parse_bool(value: &str) -> Result<Option<bool>, ReportFormatError> {
    match value {
        "" => Ok(None),
        "True" | "true" => Ok(Some(true)),
        "False" | "false" => Ok(Some(false)),
        other => Err(ReportFormatError::Boolean(other.to_string())),
    }
}

fn parse_ip_addresses(value: &str) -> Result<Vec<ZonedIpAddr>, ReportFormatError> {
    if value.is_empty() {
        return Ok(Vec::new());
    }
    value
        .split(';')
        .map(|entry| {
            let (ip, zone) = match entry.split_once('%') {
                Some((ip, zone)) => (ip, Some(zone.to_string())),
                None => (entry, None),
            };
            ip.parse::<IpAddr>()
                .map(|addr| ZonedIpAddr { addr, zone })
                .map_err(|_| ReportFormatError::IpAddress(ip.to_string()))
        })
        .collect()
}
