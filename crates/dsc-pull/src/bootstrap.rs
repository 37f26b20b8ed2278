//! Wiring a server from configuration.

use bytes::Bytes;
use dsc_config::{
    ConfigurationKind, ConfigurationStorage, PullServerConfig, StorageConfig, StoreKind,
};
use dsc_core::{ConfigurationRepository, DscError, NodeStatus, ReportServer};
use dsc_server::{Manager, Server, ServerConfig, ServerError};
use dsc_store::{
    LocalConfigurationRepository, LocalNodeStatus, LocalReportServer, MemoryNodeStatus,
    MemoryReportServer, ModuleSpec, StaticConfigurationRepository,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while assembling the server.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// The static backend was selected without a document.
    #[error("static configuration storage requires a document")]
    MissingDocument,

    /// A file the static backend serves could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The node-status store could not be opened.
    #[error("error creating node status store: {0}")]
    Status(#[source] DscError),

    /// The server could not be built.
    #[error(transparent)]
    Server(#[from] ServerError),
}

/// The three storage collaborators.
#[derive(Clone)]
pub struct Backends {
    /// Configuration and module source.
    pub repository: Arc<dyn ConfigurationRepository>,
    /// Report store.
    pub reports: Arc<dyn ReportServer>,
    /// Registration store.
    pub status: Arc<dyn NodeStatus>,
}

impl std::fmt::Debug for Backends {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backends").finish_non_exhaustive()
    }
}

/// Builds the storage collaborators named in `storage`.
pub async fn build_backends(storage: &StorageConfig) -> Result<Backends, BootstrapError> {
    let repository = build_repository(&storage.configuration).await?;

    let reports: Arc<dyn ReportServer> = match storage.reports.kind {
        StoreKind::Local => Arc::new(LocalReportServer::new(&storage.reports.root)),
        StoreKind::Memory => Arc::new(MemoryReportServer::new()),
    };

    let status: Arc<dyn NodeStatus> = match storage.status.kind {
        StoreKind::Local => Arc::new(
            LocalNodeStatus::open(&storage.status.path)
                .await
                .map_err(BootstrapError::Status)?,
        ),
        StoreKind::Memory => Arc::new(MemoryNodeStatus::new()),
    };

    tracing::info!(
        configuration = ?storage.configuration.kind,
        reports = ?storage.reports.kind,
        status = ?storage.status.kind,
        "storage backends ready"
    );

    Ok(Backends {
        repository,
        reports,
        status,
    })
}

async fn build_repository(
    storage: &ConfigurationStorage,
) -> Result<Arc<dyn ConfigurationRepository>, BootstrapError> {
    match storage.kind {
        ConfigurationKind::Local => Ok(Arc::new(LocalConfigurationRepository::new(&storage.root))),
        ConfigurationKind::Static => {
            let path = storage
                .document
                .as_ref()
                .ok_or(BootstrapError::MissingDocument)?;
            let document = read(path).await?;

            let mut modules = Vec::with_capacity(storage.modules.len());
            for module in &storage.modules {
                modules.push((
                    ModuleSpec::new(&module.name, &module.version),
                    read(&module.path).await?,
                ));
            }

            Ok(Arc::new(StaticConfigurationRepository::new(document, modules)))
        }
    }
}

async fn read(path: &Path) -> Result<Bytes, BootstrapError> {
    tokio::fs::read(path)
        .await
        .map(Bytes::from)
        .map_err(|source| BootstrapError::Read {
            path: path.to_path_buf(),
            source,
        })
}

/// Transport settings taken from the configuration.
#[must_use]
pub fn server_config(config: &PullServerConfig) -> ServerConfig {
    ServerConfig::builder()
        .http_addr(config.server.http_addr.clone())
        .max_body_bytes(config.server.max_body_bytes)
        .shutdown_timeout(Duration::from_secs(config.server.shutdown_timeout_secs))
        .request_timeout(Duration::from_millis(config.server.request_timeout_ms))
        .build()
}

/// Builds the manager over `backends`.
pub fn build_manager(
    config: &PullServerConfig,
    backends: Backends,
) -> Result<Manager, BootstrapError> {
    let manager = Manager::builder(backends.repository, backends.reports, backends.status)
        .registration_keys(config.auth.keys.clone())
        .max_body_bytes(config.server.max_body_bytes)
        .build()?;
    Ok(manager)
}

/// Builds a ready-to-run server from configuration.
pub async fn build_server(config: &PullServerConfig) -> Result<Server, BootstrapError> {
    let backends = build_backends(&config.storage).await?;
    let manager = build_manager(config, backends)?;

    if config.auth.is_enabled() {
        tracing::info!(keys = config.auth.keys.len(), "shared-key request signing enabled");
    }

    Ok(Server::new(server_config(config), manager))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsc_config::StaticModule;
    use dsc_core::{GetConfigurationRequest, GetModuleRequest};

    #[tokio::test]
    async fn test_memory_backends() {
        let mut storage = StorageConfig::default();
        storage.reports.kind = StoreKind::Memory;
        storage.status.kind = StoreKind::Memory;

        assert!(build_backends(&storage).await.is_ok());
    }

    #[tokio::test]
    async fn test_local_status_requires_directory() {
        let mut storage = StorageConfig::default();
        storage.status.path = PathBuf::from("/nonexistent/dsc/status");

        let err = build_backends(&storage).await.unwrap_err();
        assert!(matches!(err, BootstrapError::Status(_)));
    }

    #[tokio::test]
    async fn test_static_repository_without_document() {
        let mut storage = StorageConfig::default();
        storage.configuration.kind = ConfigurationKind::Static;
        storage.status.kind = StoreKind::Memory;

        let err = build_backends(&storage).await.unwrap_err();
        assert!(matches!(err, BootstrapError::MissingDocument));
    }

    #[tokio::test]
    async fn test_static_repository_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let document = dir.path().join("localhost.mof");
        let module = dir.path().join("xnetworking.zip");
        std::fs::write(&document, b"instance of OMI_ConfigurationDocument {};").unwrap();
        std::fs::write(&module, b"PK").unwrap();

        let mut storage = StorageConfig::default();
        storage.configuration.kind = ConfigurationKind::Static;
        storage.configuration.document = Some(document);
        storage.configuration.modules = vec![StaticModule {
            name: "xNetworking".to_string(),
            version: "5.7.0.0".to_string(),
            path: module,
        }];
        storage.status.kind = StoreKind::Memory;

        let backends = build_backends(&storage).await.unwrap();
        let configuration = backends
            .repository
            .get_configuration(&GetConfigurationRequest::new("agent", "Anything"))
            .await
            .unwrap();
        assert_eq!(
            &configuration.content[..],
            b"instance of OMI_ConfigurationDocument {};"
        );

        let module = backends
            .repository
            .get_module(&GetModuleRequest::new("agent", "XNETWORKING", "5.7.0.0"))
            .await
            .unwrap();
        assert_eq!(&module.content[..], b"PK");
    }

    #[tokio::test]
    async fn test_unreadable_module_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let document = dir.path().join("doc.mof");
        std::fs::write(&document, b"doc").unwrap();

        let mut storage = StorageConfig::default();
        storage.configuration.kind = ConfigurationKind::Static;
        storage.configuration.document = Some(document);
        storage.configuration.modules = vec![StaticModule {
            name: "Missing".to_string(),
            version: String::new(),
            path: dir.path().join("missing.zip"),
        }];

        let err = build_backends(&storage).await.unwrap_err();
        assert!(matches!(err, BootstrapError::Read { ref path, .. } if path.ends_with("missing.zip")));
    }

    #[test]
    fn test_server_config_mapping() {
        let mut config = PullServerConfig::default();
        config.server.http_addr = "0.0.0.0:8443".to_string();
        config.server.max_body_bytes = 4096;
        config.server.request_timeout_ms = 250;

        let server = server_config(&config);
        assert_eq!(server.http_addr(), "0.0.0.0:8443");
        assert_eq!(server.max_body_bytes(), 4096);
        assert_eq!(server.request_timeout(), Duration::from_millis(250));
        assert_eq!(server.shutdown_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_manager_has_auth_stage_with_keys() {
        let mut config = PullServerConfig::default();
        config.auth.keys = vec!["f65e1a0c-46b0-424c-a6a5-c3701aef32e5".to_string()];

        let backends = Backends {
            repository: Arc::new(LocalConfigurationRepository::new("unused")),
            reports: Arc::new(MemoryReportServer::new()),
            status: Arc::new(MemoryNodeStatus::new()),
        };
        let manager = build_manager(&config, backends).unwrap();
        assert_eq!(manager.stage_names().len(), 4);
        assert_eq!(manager.route_count(), 12);
    }
}
