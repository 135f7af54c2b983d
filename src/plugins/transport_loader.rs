//! Transport Loader - Picks the deploy transport for a repository URL
//!
//! # Example
//!
//! ```
//! use deferred_deployer::plugins::transport_loader::{TransportLoader, TransportScheme};
//!
//! assert_eq!(
//!     TransportScheme::from_url("https://repo.example.com/releases"),
//!     Some(TransportScheme::Https)
//! );
//! assert!(TransportLoader::default().supports("file:///srv/repo"));
//! assert!(!TransportLoader::default().supports("scp://host/repo"));
//! ```

use crate::build::PublishableArtifact;
use crate::core::{ArtifactDeployer, DeployError, TransferError};
use crate::plugins::filesystem_repository::FileSystemRepository;
use crate::plugins::http_repository::HttpRepository;
use crate::repository::RepositoryDescriptor;
use crate::security::RepositoryCredentials;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// URL scheme of a repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportScheme {
    File,
    Http,
    Https,
}

impl TransportScheme {
    /// Get string representation of the scheme
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportScheme::File => "file",
            TransportScheme::Http => "http",
            TransportScheme::Https => "https",
        }
    }

    /// Scheme of `url`, if supported
    pub fn from_url(url: &str) -> Option<Self> {
        let (scheme, _) = url.split_once("://")?;
        match scheme.to_ascii_lowercase().as_str() {
            "file" => Some(TransportScheme::File),
            "http" => Some(TransportScheme::Http),
            "https" => Some(TransportScheme::Https),
            _ => None,
        }
    }
}

/// Creates deployers for resolved repositories
///
/// Also usable as a deployer itself: every call is routed by the URL
/// scheme of the target repository.
pub struct TransportLoader {
    http: Arc<HttpRepository>,
}

impl Default for TransportLoader {
    fn default() -> Self {
        Self::new(None)
    }
}

impl TransportLoader {
    /// Create a loader; credentials only apply to HTTP transports
    pub fn new(credentials: Option<RepositoryCredentials>) -> Self {
        Self {
            http: Arc::new(HttpRepository::new(credentials)),
        }
    }

    pub fn supports(&self, url: &str) -> bool {
        TransportScheme::from_url(url).is_some()
    }

    /// Deployer for `repository`
    pub fn deployer_for(
        &self,
        repository: &RepositoryDescriptor,
    ) -> Result<Arc<dyn ArtifactDeployer>, DeployError> {
        let scheme =
            TransportScheme::from_url(&repository.url).ok_or_else(|| {
                DeployError::UnsupportedTransport {
                    url: repository.url.clone(),
                }
            })?;

        debug!("Using {} transport for {}", scheme.as_str(), repository.id);

        let deployer: Arc<dyn ArtifactDeployer> = match scheme {
            TransportScheme::File => Arc::new(FileSystemRepository::new(
                FileSystemRepository::path_from_url(&repository.url),
            )),
            TransportScheme::Http | TransportScheme::Https => self.http.clone(),
        };

        Ok(deployer)
    }
}

#[async_trait]
impl ArtifactDeployer for TransportLoader {
    fn name(&self) -> &str {
        "transport-loader"
    }

    async fn deploy(
        &self,
        repository: &RepositoryDescriptor,
        artifacts: &[PublishableArtifact],
    ) -> Result<(), TransferError> {
        let deployer = self
            .deployer_for(repository)
            .map_err(|e| TransferError::new(e.to_string()))?;
        deployer.deploy(repository, artifacts).await
    }
}
