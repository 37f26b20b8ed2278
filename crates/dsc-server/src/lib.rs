//! # DSC Server
//!
//! HTTP front end of the DSC pull server.
//!
//! - [`Manager`] - route table, middleware pipeline and protocol handlers
//! - [`Server`] - hyper HTTP/1 transport with graceful shutdown
//! - [`ShutdownSignal`] - programmatic or OS-signal shutdown trigger
//!
//! Each protocol endpoint maps to one storage collaborator call:
//!
//! | Route | Method | Collaborator |
//! |-------|--------|--------------|
//! | `Nodes(AgentId='…')` | PUT | repository + node status, or report server |
//! | `Nodes(AgentId='…')/Configurations(ConfigurationName='…')/ConfigurationContent` | GET | repository |
//! | `Modules(ModuleName='…',ModuleVersion='…')/ModuleContent` | GET | repository |
//! | `Nodes(AgentId='…')/GetDscAction` | POST | node status |
//! | `Nodes(AgentId='…')/SendReport` | POST | report server |
//! | `Nodes(AgentId='…')/Reports(JobId='…')` | GET | report server |
//!
//! Version 1 routes and `CertificateRotation` answer 501.

#![doc(html_root_url = "https://docs.rs/dsc-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod handlers;
mod manager;
mod server;
pub mod shutdown;

pub use config::{
    ServerConfig, ServerConfigBuilder, DEFAULT_HTTP_ADDR, DEFAULT_REQUEST_TIMEOUT_MS,
    DEFAULT_SHUTDOWN_TIMEOUT_SECS,
};
pub use error::ServerError;
pub use handlers::{Endpoint, AGENT_ID_HEADER, CHECKSUM_ALGORITHM_HEADER, CHECKSUM_HEADER};
pub use manager::{Manager, ManagerBuilder};
pub use server::Server;
pub use shutdown::ShutdownSignal;
