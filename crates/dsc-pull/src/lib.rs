//! # DSC Pull
//!
//! A pull server for PowerShell Desired State Configuration agents speaking
//! protocol version 2.0.
//!
//! Agents register, ask whether their configuration is current, download
//! configuration documents and module archives, and push status reports.
//! The server answers from three pluggable storage collaborators:
//!
//! ```text
//! Agent ──HTTP──▶ Server ─▶ Pipeline ─▶ Router ─▶ Handler ─┬─▶ ConfigurationRepository
//!                                                          ├─▶ ReportServer
//!                                                          └─▶ NodeStatus
//! ```
//!
//! This crate re-exports the workspace crates and builds a runnable server
//! from a [`PullServerConfig`](config::PullServerConfig).
//!
//! ## Example
//!
//! ```rust,ignore
//! use dsc_pull::config::ConfigLoader;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::new().with_env_prefix("DSC").load()?;
//!     dsc_pull::build_server(&config).await?.run().await?;
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/dsc-pull/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod bootstrap;

pub use bootstrap::{
    build_backends, build_manager, build_server, server_config, Backends, BootstrapError,
};

pub use dsc_config as config;
pub use dsc_core as core;
pub use dsc_middleware as middleware;
pub use dsc_router as router;
pub use dsc_server as server;
pub use dsc_store as store;
pub use dsc_telemetry as telemetry;

/// Package version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
