//! Filesystem Repository - Local and `file://` repository transport
//!
//! Writes artifacts into a directory using the default layout. Serves both
//! as the local install target and as a deploy target for `file://` URLs.

use crate::build::{
    ArtifactCoordinates, ArtifactMetadata, PublishableArtifact, RepositoryEvent, TransferStage,
};
use crate::core::{ArtifactDeployer, ArtifactInstaller, RepositoryListener, TransferError};
use crate::repository::{RepositoryDescriptor, RepositoryLayout};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::debug;

const FILE_SCHEME: &str = "file://";

/// Directory-backed repository
pub struct FileSystemRepository {
    root: PathBuf,
    layout: RepositoryLayout,
    listeners: Vec<Arc<dyn RepositoryListener>>,
}

impl FileSystemRepository {
    /// Create a repository rooted at `root` (used for installs)
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            layout: RepositoryLayout::Default,
            listeners: Vec::new(),
        }
    }

    /// Register a listener for transfer events
    pub fn with_listener(mut self, listener: Arc<dyn RepositoryListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory behind a `file://` URL or a plain path
    pub fn path_from_url(url: &str) -> PathBuf {
        PathBuf::from(url.strip_prefix(FILE_SCHEME).unwrap_or(url))
    }

    fn notify(&self, event: RepositoryEvent) {
        for listener in &self.listeners {
            listener.on_repository_event(&event);
        }
    }

    /// Copy every artifact (and its descriptor) below `root`
    async fn store(
        &self,
        root: &Path,
        artifacts: &[PublishableArtifact],
        active: TransferStage,
        done: TransferStage,
    ) -> Result<(), TransferError> {
        for artifact in artifacts {
            let target = root.join(self.layout.path_of(&artifact.coordinates));

            self.notify(RepositoryEvent::Artifact {
                stage: active,
                artifact: artifact.coordinates.clone(),
            });
            copy_file(&artifact.file, &target).await?;
            debug!("{} -> {}", artifact.file.display(), target.display());
            self.notify(RepositoryEvent::Artifact {
                stage: done,
                artifact: artifact.coordinates.clone(),
            });

            for metadata in &artifact.metadata {
                match metadata {
                    ArtifactMetadata::ProjectDescriptor { path } => {
                        let descriptor = descriptor_coordinates(&artifact.coordinates);
                        let target = root.join(self.layout.path_of(&descriptor));

                        self.notify(RepositoryEvent::Metadata {
                            stage: active,
                            path: target.clone(),
                        });
                        copy_file(path, &target).await?;
                        self.notify(RepositoryEvent::Metadata {
                            stage: done,
                            path: target,
                        });
                    }
                }
            }
        }

        Ok(())
    }
}

/// Coordinates of the descriptor that travels with a primary artifact
fn descriptor_coordinates(primary: &ArtifactCoordinates) -> ArtifactCoordinates {
    ArtifactCoordinates::new(
        &primary.group_id,
        &primary.artifact_id,
        &primary.version,
        "pom",
    )
}

async fn copy_file(source: &Path, target: &Path) -> Result<(), TransferError> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::copy(source, target).await.map_err(|e| {
        TransferError::new(format!(
            "Could not copy {} to {}: {}",
            source.display(),
            target.display(),
            e
        ))
    })?;
    Ok(())
}

#[async_trait]
impl ArtifactInstaller for FileSystemRepository {
    fn name(&self) -> &str {
        "filesystem"
    }

    async fn install(&self, artifacts: &[PublishableArtifact]) -> Result<(), TransferError> {
        self.store(
            &self.root,
            artifacts,
            TransferStage::Installing,
            TransferStage::Installed,
        )
        .await
    }
}

#[async_trait]
impl ArtifactDeployer for FileSystemRepository {
    fn name(&self) -> &str {
        "filesystem"
    }

    async fn deploy(
        &self,
        repository: &RepositoryDescriptor,
        artifacts: &[PublishableArtifact],
    ) -> Result<(), TransferError> {
        let root = Self::path_from_url(&repository.url);
        self.store(
            &root,
            artifacts,
            TransferStage::Deploying,
            TransferStage::Deployed,
        )
        .await
    }
}
