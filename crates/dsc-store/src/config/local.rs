//! Configuration repository backed by a directory tree.
//!
//! ```text
//! <root>/config/<configuration name>
//! <root>/modules/<module name>/<module version>.zip
//! ```
//!
//! Every path component is lower-cased. Identifiers that would step outside
//! the root are rejected as validation errors.

use async_trait::async_trait;
use crate::path::component;
use dsc_core::{
    Artifact, ConfigurationRepository, DscError, DscResult, GetConfigurationRequest,
    GetModuleRequest, RegisterDscAgentRequest,
};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Serves configurations and modules from files under `root`.
#[derive(Debug, Clone)]
pub struct LocalConfigurationRepository {
    root: PathBuf,
}

impl LocalConfigurationRepository {
    /// Creates a repository rooted at `root`. The directory is not checked.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn configuration_path(&self, name: &str) -> DscResult<PathBuf> {
        Ok(self
            .root
            .join("config")
            .join(component("configuration name", name)?))
    }

    fn module_path(&self, name: &str, version: &str) -> DscResult<PathBuf> {
        Ok(self
            .root
            .join("modules")
            .join(component("module name", name)?)
            .join(format!("{}.zip", component("module version", version)?)))
    }
}

#[async_trait]
impl ConfigurationRepository for LocalConfigurationRepository {
    async fn register_agent(&self, _request: &RegisterDscAgentRequest) -> DscResult<()> {
        Ok(())
    }

    async fn get_configuration(&self, request: &GetConfigurationRequest) -> DscResult<Artifact> {
        match tokio::fs::read(self.configuration_path(&request.configuration_name)?).await {
            Ok(content) => Ok(Artifact::from_content(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(DscError::configuration_not_found(
                &request.agent_id,
                &request.configuration_name,
            )),
            Err(e) => Err(e.into()),
        }
    }

    async fn get_module(&self, request: &GetModuleRequest) -> DscResult<Artifact> {
        match tokio::fs::read(self.module_path(&request.name, &request.version)?).await {
            Ok(content) => Ok(Artifact::from_content(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(DscError::module_not_found(
                &request.agent_id,
                &request.name,
                &request.version,
            )),
            Err(e) => Err(e.into()),
        }
    }
}
