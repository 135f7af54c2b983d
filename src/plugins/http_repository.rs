//! HTTP Repository - Deploys artifacts with HTTP PUT

use crate::build::{ArtifactCoordinates, ArtifactMetadata, PublishableArtifact};
use crate::core::{ArtifactDeployer, TransferError};
use crate::repository::RepositoryDescriptor;
use crate::security::RepositoryCredentials;
use async_trait::async_trait;
use secrecy::ExposeSecret;
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// Remote repository reachable over `http://` or `https://`
pub struct HttpRepository {
    client: reqwest::Client,
    credentials: Option<RepositoryCredentials>,
}

impl Default for HttpRepository {
    fn default() -> Self {
        Self::new(None)
    }
}

impl HttpRepository {
    pub fn new(credentials: Option<RepositoryCredentials>) -> Self {
        Self {
            client: reqwest::Client::new(),
            credentials,
        }
    }

    async fn put(&self, url: &str, file: &Path) -> Result<(), TransferError> {
        let body = fs::read(file).await.map_err(|e| {
            TransferError::new(format!("Could not read {}: {}", file.display(), e))
        })?;

        let mut request = self.client.put(url).body(body);
        if let Some(credentials) = &self.credentials {
            request = request.basic_auth(
                credentials.username(),
                Some(credentials.password().expose_secret()),
            );
        }

        let response = request
            .send()
            .await
            .map_err(|e| TransferError::new(format!("PUT {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(TransferError::new(format!(
                "PUT {} returned HTTP {}",
                url,
                response.status()
            )));
        }

        debug!("Uploaded {}", url);
        Ok(())
    }
}

#[async_trait]
impl ArtifactDeployer for HttpRepository {
    fn name(&self) -> &str {
        "http"
    }

    async fn deploy(
        &self,
        repository: &RepositoryDescriptor,
        artifacts: &[PublishableArtifact],
    ) -> Result<(), TransferError> {
        for artifact in artifacts {
            self.put(&repository.artifact_url(&artifact.coordinates), &artifact.file)
                .await?;

            for metadata in &artifact.metadata {
                match metadata {
                    ArtifactMetadata::ProjectDescriptor { path } => {
                        let descriptor = ArtifactCoordinates::new(
                            &artifact.coordinates.group_id,
                            &artifact.coordinates.artifact_id,
                            &artifact.coordinates.version,
                            "pom",
                        );
                        self.put(&repository.artifact_url(&descriptor), path).await?;
                    }
                }
            }
        }

        Ok(())
    }
}
