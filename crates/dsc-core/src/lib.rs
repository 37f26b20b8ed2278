//! # DSC Core
//!
//! Core types and traits for the DSC pull server.
//!
//! This crate provides the protocol-level building blocks that every other
//! crate in the workspace shares:
//!
//! - [`DscError`] - Typed error taxonomy with HTTP status mapping
//! - [`wire`] - JSON request and response bodies, spelled as the protocol spells them
//! - [`ConfigurationRepository`], [`ReportServer`], [`NodeStatus`] - Storage collaborator traits
//! - [`reconcile`] - The status reconciliation engine behind `GetDscAction`
//! - [`Artifact`] - A served configuration or module with its content checksum
//!
//! Identifiers (agent ids, configuration names, module specs) are compared
//! case-insensitively. [`canonical`] produces the storage key for any of them.

#![doc(html_root_url = "https://docs.rs/dsc-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod artifact;
mod collaborator;
mod error;
pub mod reconcile;
mod request;
pub mod wire;

pub use artifact::{sha256_checksum, Artifact, CHECKSUM_ALGORITHM};
pub use collaborator::{
    configuration_hash, ConfigurationHasher, ConfigurationRepository, NodeStatus, ReportServer,
};
pub use error::{DscError, DscResult, ErrorCategory};
pub use reconcile::reconcile;
pub use request::{
    canonical, is_configuration_name, GetConfigurationRequest, GetDscActionRequest, GetModuleRequest, GetReportsRequest,
    RegisterDscAgentRequest, SendReportRequest,
};
pub use wire::Verdict;

/// The only protocol version this server speaks.
pub const PROTOCOL_VERSION: &str = "2.0";
