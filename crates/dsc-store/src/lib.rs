//! # DSC Store
//!
//! Collaborator backends for the DSC pull server.
//!
//! | Role | Backend | Type |
//! |------|---------|------|
//! | Configuration repository | files under a root | [`LocalConfigurationRepository`] |
//! | Configuration repository | one fixed document | [`StaticConfigurationRepository`] |
//! | Report server | files under a root | [`LocalReportServer`] |
//! | Report server | process memory | [`MemoryReportServer`] |
//! | Node status | one file per agent | [`LocalNodeStatus`] |
//! | Node status | process memory | [`MemoryNodeStatus`] |
//!
//! Every backend keys its storage on [`dsc_core::canonical`] identifiers, so
//! lookups are case-insensitive.

#![doc(html_root_url = "https://docs.rs/dsc-store/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
mod path;
pub mod report;
pub mod status;

pub use config::{LocalConfigurationRepository, ModuleSpec, StaticConfigurationRepository};
pub use report::{LocalReportServer, MemoryReportServer};
pub use status::{LocalNodeStatus, MemoryNodeStatus};
