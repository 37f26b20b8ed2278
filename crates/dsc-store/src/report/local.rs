//! Report server backed by a directory tree.

use async_trait::async_trait;
use bytes::Bytes;
use crate::path::component;
use dsc_core::{DscError, DscResult, GetReportsRequest, ReportServer, SendReportRequest};
use std::io::ErrorKind;
use std::path::PathBuf;

/// Stores each report at `<root>/<agent>/<job>.json`, lower-cased.
#[derive(Debug, Clone)]
pub struct LocalReportServer {
    root: PathBuf,
}

impl LocalReportServer {
    /// Creates a report server rooted at `root`; directories are created on
    /// first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn report_path(&self, agent_id: &str, job_id: &str) -> DscResult<PathBuf> {
        Ok(self
            .root
            .join(component("agent id", agent_id)?)
            .join(format!("{}.json", component("job id", job_id)?)))
    }
}

#[async_trait]
impl ReportServer for LocalReportServer {
    async fn send_report(&self, request: &SendReportRequest) -> DscResult<()> {
        let path = self.report_path(&request.agent_id, request.job_id())?;
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        tokio::fs::write(&path, &request.raw).await?;
        tracing::debug!(path = %path.display(), bytes = request.raw.len(), "stored report");
        Ok(())
    }

    async fn get_report(&self, request: &GetReportsRequest) -> DscResult<Bytes> {
        match tokio::fs::read(self.report_path(&request.agent_id, &request.job_id)?).await {
            Ok(content) => Ok(Bytes::from(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(DscError::report_not_found(
                &request.agent_id,
                &request.job_id,
            )),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsc_core::wire::SendReportRequestBody;

    const AGENT: &str = "B1F28971-2CEB-46D5-9DCB-79C044395F81";
    const JOB: &str = "6C2B10A4-93D8-4F4E-9A43-2D11D5B0E7C1";

    fn report(raw: &'static [u8]) -> SendReportRequest {
        SendReportRequest {
            agent_id: AGENT.to_string(),
            body: SendReportRequestBody {
                job_id: JOB.to_string(),
                ..SendReportRequestBody::default()
            },
            raw: Bytes::from_static(raw),
        }
    }

    #[tokio::test]
    async fn test_round_trip_preserves_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let server = LocalReportServer::new(dir.path().join("reports"));
        let raw = br#"{"JobId":"6C2B10A4-93D8-4F4E-9A43-2D11D5B0E7C1",  "Unknown":1}"#;

        server.send_report(&report(raw)).await.unwrap();

        let stored = dir
            .path()
            .join("reports")
            .join(AGENT.to_lowercase())
            .join(format!("{}.json", JOB.to_lowercase()));
        assert!(stored.is_file());

        let fetched = server
            .get_report(&GetReportsRequest::new(AGENT.to_lowercase(), JOB))
            .await
            .unwrap();
        assert_eq!(&fetched[..], raw);
    }

    #[tokio::test]
    async fn test_job_id_outside_root_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let server = LocalReportServer::new(dir.path().join("reports"));
        let mut request = report(b"{}");
        request.body.job_id = "../../escaped".to_string();

        let err = server.send_report(&request).await.unwrap_err();
        assert!(matches!(err, DscError::Validation { .. }));
        assert!(!dir.path().join("escaped.json").exists());
        assert!(!dir.path().join("reports").exists());
    }

    #[tokio::test]
    async fn test_missing_report() {
        let dir = tempfile::tempdir().unwrap();
        let server = LocalReportServer::new(dir.path());
        let err = server
            .get_report(&GetReportsRequest::new(AGENT, JOB))
            .await
            .unwrap_err();
        assert!(matches!(err, DscError::ReportNotFound { .. }));
    }
}
