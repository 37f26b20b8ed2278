//! In-memory report server.

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use dsc_core::{canonical, DscError, DscResult, GetReportsRequest, ReportServer, SendReportRequest};

/// Keeps reports in a concurrent map keyed by (agent, job).
///
/// Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryReportServer {
    reports: DashMap<(String, String), Bytes>,
}

impl MemoryReportServer {
    /// Creates an empty report server.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored reports.
    #[must_use]
    pub fn len(&self) -> usize {
        self.reports.len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }
}

#[async_trait]
impl ReportServer for MemoryReportServer {
    async fn send_report(&self, request: &SendReportRequest) -> DscResult<()> {
        self.reports.insert(
            (canonical(&request.agent_id), canonical(request.job_id())),
            request.raw.clone(),
        );
        Ok(())
    }

    async fn get_report(&self, request: &GetReportsRequest) -> DscResult<Bytes> {
        self.reports
            .get(&(canonical(&request.agent_id), canonical(&request.job_id)))
            .map(|entry| entry.value().clone())
            .ok_or_else(|| DscError::report_not_found(&request.agent_id, &request.job_id))
    }
}
