//! Configuration repository serving one fixed document.
//!
//! Every configuration name resolves to the same document, so the checksum is
//! computed once and answered without touching the content.

use async_trait::async_trait;
use bytes::Bytes;
use dsc_core::{
    canonical, Artifact, ConfigurationHasher, ConfigurationRepository, DscError, DscResult,
    GetConfigurationRequest, GetModuleRequest, RegisterDscAgentRequest,
};
use std::collections::HashMap;

/// Module identity, matched case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleSpec {
    /// Module name.
    pub name: String,
    /// Module version, possibly empty.
    pub version: String,
}

impl ModuleSpec {
    /// Builds a spec in canonical form.
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            name: canonical(name),
            version: canonical(version),
        }
    }
}

/// Serves a single in-memory document and a fixed module table.
#[derive(Debug, Clone)]
pub struct StaticConfigurationRepository {
    document: Artifact,
    modules: HashMap<ModuleSpec, Artifact>,
}

impl StaticConfigurationRepository {
    /// Creates a repository serving `document` for every name.
    pub fn new<I>(document: impl Into<Bytes>, modules: I) -> Self
    where
        I: IntoIterator<Item = (ModuleSpec, Bytes)>,
    {
        Self {
            document: Artifact::from_content(document),
            modules: modules
                .into_iter()
                .map(|(spec, content)| {
                    (
                        ModuleSpec::new(&spec.name, &spec.version),
                        Artifact::from_content(content),
                    )
                })
                .collect(),
        }
    }

    /// Number of modules served.
    #[must_use]
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }
}

#[async_trait]
impl ConfigurationRepository for StaticConfigurationRepository {
    async fn register_agent(&self, _request: &RegisterDscAgentRequest) -> DscResult<()> {
        Ok(())
    }

    async fn get_configuration(&self, _request: &GetConfigurationRequest) -> DscResult<Artifact> {
        Ok(self.document.clone())
    }

    async fn get_module(&self, request: &GetModuleRequest) -> DscResult<Artifact> {
        self.modules
            .get(&ModuleSpec::new(&request.name, &request.version))
            .cloned()
            .ok_or_else(|| {
                DscError::module_not_found(&request.agent_id, &request.name, &request.version)
            })
    }

    fn hasher(&self) -> Option<&dyn ConfigurationHasher> {
        Some(self)
    }
}

#[async_trait]
impl ConfigurationHasher for StaticConfigurationRepository {
    async fn configuration_hash(
        &self,
        _request: &GetConfigurationRequest,
    ) -> DscResult<Option<String>> {
        Ok(Some(self.document.checksum.clone()))
    }
}
