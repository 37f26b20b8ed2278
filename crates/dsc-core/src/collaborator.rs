//! Storage collaborator traits.
//!
//! The protocol engine never touches storage directly. It talks to three
//! roles, each selected once at startup and shared behind an `Arc`:
//!
//! - [`ConfigurationRepository`] serves configuration documents and modules
//! - [`ReportServer`] stores and returns status reports
//! - [`NodeStatus`] keeps agent registrations and answers `GetDscAction`
//!
//! A repository that can produce a configuration checksum without reading
//! the whole document also exposes [`ConfigurationHasher`] through
//! [`ConfigurationRepository::hasher`].

use crate::artifact::Artifact;
use crate::error::DscResult;
use crate::reconcile::reconcile_with_repository;
use crate::request::{
    GetConfigurationRequest, GetDscActionRequest, GetModuleRequest, GetReportsRequest,
    RegisterDscAgentRequest, SendReportRequest,
};
use crate::wire::GetDscActionResponseBody;
use async_trait::async_trait;
use bytes::Bytes;

/// Source of configuration documents and module archives.
///
/// Lookups are case-insensitive on every identifier and must fail with
/// [`DscError::ConfigurationNotFound`](crate::DscError::ConfigurationNotFound)
/// or [`DscError::ModuleNotFound`](crate::DscError::ModuleNotFound) when
/// nothing matches.
#[async_trait]
pub trait ConfigurationRepository: Send + Sync {
    /// Records an agent registration. Most repositories need nothing.
    async fn register_agent(&self, request: &RegisterDscAgentRequest) -> DscResult<()>;

    /// Fetches a configuration document.
    async fn get_configuration(&self, request: &GetConfigurationRequest) -> DscResult<Artifact>;

    /// Fetches a module archive.
    async fn get_module(&self, request: &GetModuleRequest) -> DscResult<Artifact>;

    /// The fast checksum capability, when this repository has one.
    fn hasher(&self) -> Option<&dyn ConfigurationHasher> {
        None
    }
}

/// Optional capability: configuration checksums without the content.
#[async_trait]
pub trait ConfigurationHasher: Send + Sync {
    /// Returns the checksum of a configuration, or `None` when this
    /// repository cannot answer cheaply for that name.
    async fn configuration_hash(
        &self,
        request: &GetConfigurationRequest,
    ) -> DscResult<Option<String>>;
}

/// Store of status reports.
#[async_trait]
pub trait ReportServer: Send + Sync {
    /// Records an agent registration of type `ReportServer`.
    async fn register_agent(&self, _request: &RegisterDscAgentRequest) -> DscResult<()> {
        Ok(())
    }

    /// Stores the raw report bytes under (agent, job).
    async fn send_report(&self, request: &SendReportRequest) -> DscResult<()>;

    /// Returns the stored report bytes, unmodified.
    async fn get_report(&self, request: &GetReportsRequest) -> DscResult<Bytes>;
}

/// Store of agent registrations.
#[async_trait]
pub trait NodeStatus: Send + Sync {
    /// Replaces the agent's list of configuration names.
    async fn register_agent(&self, request: &RegisterDscAgentRequest) -> DscResult<()>;

    /// Returns the agent's registered configuration names in order, or
    /// [`DscError::AgentNotRegistered`](crate::DscError::AgentNotRegistered).
    async fn registered_names(&self, agent_id: &str) -> DscResult<Vec<String>>;

    /// Decides the agent's next action.
    ///
    /// The default looks up the registration and runs the reconciliation
    /// engine against `repository`.
    async fn get_dsc_action(
        &self,
        repository: &dyn ConfigurationRepository,
        request: &GetDscActionRequest,
    ) -> DscResult<GetDscActionResponseBody> {
        let registered = self.registered_names(&request.agent_id).await?;
        reconcile_with_repository(
            repository,
            &request.agent_id,
            &registered,
            &request.body.client_status,
        )
        .await
    }
}

/// Returns the checksum of a configuration.
///
/// Uses the repository's [`ConfigurationHasher`] when present and it yields a
/// non-empty checksum; otherwise fetches the configuration and reads the
/// checksum off the artifact.
pub async fn configuration_hash(
    repository: &dyn ConfigurationRepository,
    request: &GetConfigurationRequest,
) -> DscResult<String> {
    if let Some(hasher) = repository.hasher() {
        match hasher.configuration_hash(request).await {
            Ok(Some(checksum)) if !checksum.is_empty() => return Ok(checksum),
            Ok(_) => {}
            Err(error) => {
                tracing::debug!(
                    configuration_name = %request.configuration_name,
                    error = %error,
                    "fast checksum lookup failed, fetching configuration"
                );
            }
        }
    }

    let artifact = repository.get_configuration(request).await?;
    Ok(artifact.checksum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DscError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Repo {
        fetches: AtomicUsize,
        fast: Option<DscResult<Option<String>>>,
    }

    impl Repo {
        fn new(fast: Option<DscResult<Option<String>>>) -> Self {
            Self {
                fetches: AtomicUsize::new(0),
                fast,
            }
        }
    }

    #[async_trait]
    impl ConfigurationRepository for Repo {
        async fn register_agent(&self, _request: &RegisterDscAgentRequest) -> DscResult<()> {
            Ok(())
        }

        async fn get_configuration(
            &self,
            _request: &GetConfigurationRequest,
        ) -> DscResult<Artifact> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(Artifact::from_content("document"))
        }

        async fn get_module(&self, request: &GetModuleRequest) -> DscResult<Artifact> {
            Err(DscError::module_not_found(
                &request.agent_id,
                &request.name,
                &request.version,
            ))
        }

        fn hasher(&self) -> Option<&dyn ConfigurationHasher> {
            self.fast.as_ref().map(|_| self as &dyn ConfigurationHasher)
        }
    }

    #[async_trait]
    impl ConfigurationHasher for Repo {
        async fn configuration_hash(
            &self,
            _request: &GetConfigurationRequest,
        ) -> DscResult<Option<String>> {
            match &self.fast {
                Some(Ok(hash)) => Ok(hash.clone()),
                Some(Err(_)) => Err(DscError::internal("hash store offline")),
                None => Ok(None),
            }
        }
    }

    fn request() -> GetConfigurationRequest {
        GetConfigurationRequest::new("agent", "Web")
    }

    #[tokio::test]
    async fn test_fast_path_skips_fetch() {
        let repo = Repo::new(Some(Ok(Some("FAST".to_string()))));
        assert_eq!(configuration_hash(&repo, &request()).await.unwrap(), "FAST");
        assert_eq!(repo.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_falls_back_without_capability() {
        let repo = Repo::new(None);
        let hash = configuration_hash(&repo, &request()).await.unwrap();
        assert_eq!(hash, crate::sha256_checksum(b"document"));
        assert_eq!(repo.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_falls_back_on_empty_or_failed_fast_path() {
        for fast in [
            Ok(Some(String::new())),
            Ok(None),
            Err(DscError::internal("x")),
        ] {
            let repo = Repo::new(Some(fast));
            let hash = configuration_hash(&repo, &request()).await.unwrap();
            assert_eq!(hash, crate::sha256_checksum(b"document"));
            assert_eq!(repo.fetches.load(Ordering::SeqCst), 1);
        }
    }
}
