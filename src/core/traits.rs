//! Core traits for the host-provided transports
//!
//! Moving bytes into local storage or a remote repository, computing
//! checksums and writing the on-disk layout are left to implementations of
//! these traits. The deferred pass only decides when, whether and where.

use crate::build::{PublishableArtifact, RepositoryEvent};
use crate::core::error::TransferError;
use crate::repository::RepositoryDescriptor;
use async_trait::async_trait;

/// Copies artifacts into local storage
#[async_trait]
pub trait ArtifactInstaller: Send + Sync {
    /// Installer name (e.g., "filesystem")
    fn name(&self) -> &str;

    /// Install one unit's artifacts in a single call
    async fn install(&self, artifacts: &[PublishableArtifact]) -> Result<(), TransferError>;
}

/// Uploads artifacts to a remote repository
///
/// A call transmits the whole collection of one build unit; callers retry
/// the whole collection on failure.
#[async_trait]
pub trait ArtifactDeployer: Send + Sync {
    /// Deployer name (e.g., "http")
    fn name(&self) -> &str;

    async fn deploy(
        &self,
        repository: &RepositoryDescriptor,
        artifacts: &[PublishableArtifact],
    ) -> Result<(), TransferError>;
}

/// Receives low-level repository events
///
/// May be called from several module-build threads at once.
pub trait RepositoryListener: Send + Sync {
    fn on_repository_event(&self, event: &RepositoryEvent);
}
