//! Report servers.
//!
//! Reports are stored as the exact bytes the agent sent, so `GetReports`
//! returns them unchanged.

mod local;
mod memory;

pub use local::LocalReportServer;
pub use memory::MemoryReportServer;
