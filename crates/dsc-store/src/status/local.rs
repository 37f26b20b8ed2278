//! Node-status store with one JSON file per agent.

use async_trait::async_trait;
use crate::path::component;
use dsc_core::{DscError, DscResult, NodeStatus, RegisterDscAgentRequest};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Stores registrations as `<path>/<agent>.json`, a JSON array of
/// configuration names.
///
/// Registrations are written to a temporary file in the same directory and
/// renamed into place, so a reader never sees a partial file.
#[derive(Debug, Clone)]
pub struct LocalNodeStatus {
    path: PathBuf,
}

impl LocalNodeStatus {
    /// Opens a store over an existing directory.
    pub async fn open(path: impl Into<PathBuf>) -> DscResult<Self> {
        let path = path.into();
        let metadata = tokio::fs::metadata(&path).await?;
        if !metadata.is_dir() {
            return Err(DscError::internal(format!(
                "status store {}: path is not a directory",
                path.display()
            )));
        }
        Ok(Self { path })
    }

    /// The store directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn agent_path(&self, agent_id: &str) -> DscResult<PathBuf> {
        Ok(self
            .path
            .join(format!("{}.json", component("agent id", agent_id)?)))
    }
}

#[async_trait]
impl NodeStatus for LocalNodeStatus {
    async fn register_agent(&self, request: &RegisterDscAgentRequest) -> DscResult<()> {
        let body = serde_json::to_vec(&request.body.configuration_names)?;
        let target = self.agent_path(&request.agent_id)?;
        let temp = self.path.join(format!(
            ".{}.{}.tmp",
            component("agent id", &request.agent_id)?,
            Uuid::now_v7().simple()
        ));

        tokio::fs::write(&temp, &body).await?;
        if let Err(e) = tokio::fs::rename(&temp, &target).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(e.into());
        }
        Ok(())
    }

    async fn registered_names(&self, agent_id: &str) -> DscResult<Vec<String>> {
        match tokio::fs::read(self.agent_path(agent_id)?).await {
            Ok(content) => Ok(serde_json::from_slice(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(DscError::agent_not_registered(agent_id))
            }
            Err(e) => Err(e.into()),
        }
    }
}
