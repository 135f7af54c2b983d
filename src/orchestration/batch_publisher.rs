//! Batch Publisher - Deploys one build unit as a single batch
//!
//! Features:
//! - Primary and attached artifacts transmitted together
//! - Whole-batch retry under a bounded policy
//! - Validation before any transport call

use crate::build::BuildUnit;
use crate::core::{ArtifactDeployer, DeployError, RetryManager, RetryPolicy};
use crate::repository::RepositoryDescriptor;
use std::sync::Arc;
use tracing::{debug, info};

/// BatchPublisher - Deploys build units through an [`ArtifactDeployer`]
pub struct BatchPublisher {
    deployer: Arc<dyn ArtifactDeployer>,
}

impl BatchPublisher {
    /// Create a new BatchPublisher
    ///
    /// # Arguments
    ///
    /// * `deployer` - Transport used for every unit
    pub fn new(deployer: Arc<dyn ArtifactDeployer>) -> Self {
        Self { deployer }
    }

    /// Deploy one unit to `repository`
    ///
    /// # Arguments
    ///
    /// * `unit` - Build unit whose outputs are deployed
    /// * `repository` - Resolved destination; stamped on every artifact
    /// * `policy` - Attempt budget for the whole batch
    /// * `update_release_info` - Mark the primary artifact as a release
    ///
    /// # Returns
    ///
    /// `Ok` on the first successful attempt. Once every attempt failed, a
    /// [`DeployError::DeploymentFailed`] carrying the first attempt's error.
    pub async fn publish(
        &self,
        unit: &BuildUnit,
        repository: &RepositoryDescriptor,
        policy: RetryPolicy,
        update_release_info: bool,
    ) -> Result<(), DeployError> {
        let artifacts = unit.publishable_artifacts(Some(repository), update_release_info)?;

        info!(
            "Deploying {} to {} ({} artifact(s))",
            unit.id(),
            repository.id,
            artifacts.len()
        );
        for artifact in &artifacts {
            debug!("  {} <- {}", artifact.coordinates, artifact.file.display());
        }

        let deployer = &self.deployer;
        let artifacts = &artifacts;

        RetryManager::new(policy)
            .retry(|| async move { deployer.deploy(repository, artifacts).await })
            .await
            .map_err(|exhausted| DeployError::DeploymentFailed {
                unit: unit.id(),
                attempts: exhausted.attempts,
                source: exhausted.first_error,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::{ArtifactCoordinates, AttachedArtifact, PublishableArtifact};
    use crate::core::TransferError;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Deployer answering from a script; succeeds once the script runs out
    #[derive(Default)]
    struct ScriptedDeployer {
        script: Mutex<VecDeque<TransferError>>,
        calls: Mutex<Vec<(String, Vec<PublishableArtifact>)>>,
    }

    impl ScriptedDeployer {
        fn failing_with(errors: &[&str]) -> Self {
            Self {
                script: Mutex::new(errors.iter().map(|e| TransferError::new(*e)).collect()),
                ..Default::default()
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ArtifactDeployer for ScriptedDeployer {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn deploy(
            &self,
            repository: &RepositoryDescriptor,
            artifacts: &[PublishableArtifact],
        ) -> Result<(), TransferError> {
            self.calls
                .lock()
                .unwrap()
                .push((repository.id.clone(), artifacts.to_vec()));
            match self.script.lock().unwrap().pop_front() {
                Some(error) => Err(error),
                None => Ok(()),
            }
        }
    }

    fn repository() -> RepositoryDescriptor {
        RepositoryDescriptor::new("Repo", "http://localhost:8080/repo")
    }

    fn jar_unit(dir: &TempDir) -> BuildUnit {
        let jar = dir.path().join("core-1.0.jar");
        std::fs::write(&jar, b"jar").unwrap();

        let mut unit = BuildUnit::new("com.example", "core", "1.0", "jar", dir.path().join("pom.xml"));
        unit.primary_file = Some(jar);
        unit.attached.push(AttachedArtifact {
            coordinates: ArtifactCoordinates::new("com.example", "core", "1.0", "jar")
                .with_classifier("javadoc"),
            file: dir.path().join("core-1.0-javadoc.jar"),
            legacy: false,
        });
        unit
    }

    #[tokio::test]
    async fn test_publish_stamps_every_artifact() {
        let dir = TempDir::new().unwrap();
        let deployer = Arc::new(ScriptedDeployer::default());

        BatchPublisher::new(deployer.clone())
            .publish(&jar_unit(&dir), &repository(), RetryPolicy::default(), false)
            .await
            .unwrap();

        let calls = deployer.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (repository_id, artifacts) = &calls[0];
        assert_eq!(repository_id, "Repo");
        assert_eq!(artifacts.len(), 2);
        assert_eq!(artifacts[0].coordinates.classifier, None);
        assert!(artifacts.iter().all(|a| a.repository.as_deref() == Some("Repo")));
    }

    #[tokio::test]
    async fn test_retry_until_success() {
        let dir = TempDir::new().unwrap();
        let deployer = Arc::new(ScriptedDeployer::failing_with(&["timeout", "timeout"]));

        let result = BatchPublisher::new(deployer.clone())
            .publish(&jar_unit(&dir), &repository(), RetryPolicy::new(3), false)
            .await;

        assert!(result.is_ok());
        assert_eq!(deployer.call_count(), 3);
    }

    #[tokio::test]
    async fn test_first_error_is_surfaced() {
        let dir = TempDir::new().unwrap();
        let deployer = Arc::new(ScriptedDeployer::failing_with(&["E1", "E2"]));

        let error = BatchPublisher::new(deployer.clone())
            .publish(&jar_unit(&dir), &repository(), RetryPolicy::new(2), false)
            .await
            .unwrap_err();

        assert_eq!(
            error,
            DeployError::DeploymentFailed {
                unit: "com.example:core:1.0".to_string(),
                attempts: 2,
                source: TransferError::new("E1"),
            }
        );
        assert_eq!(deployer.call_count(), 2);
    }

    #[tokio::test]
    async fn test_every_attempt_sends_identical_batch() {
        let dir = TempDir::new().unwrap();
        let deployer = Arc::new(ScriptedDeployer::failing_with(&["E1"]));

        BatchPublisher::new(deployer.clone())
            .publish(&jar_unit(&dir), &repository(), RetryPolicy::new(2), true)
            .await
            .unwrap();

        let calls = deployer.calls.lock().unwrap();
        assert_eq!(calls[0], calls[1]);
        assert!(calls[0].1[0].release);
    }

    #[tokio::test]
    async fn test_clamped_policy_caps_attempts() {
        let dir = TempDir::new().unwrap();
        let errors: Vec<String> = (1..=20).map(|i| format!("E{i}")).collect();
        let error_refs: Vec<&str> = errors.iter().map(String::as_str).collect();
        let deployer = Arc::new(ScriptedDeployer::failing_with(&error_refs));

        let error = BatchPublisher::new(deployer.clone())
            .publish(&jar_unit(&dir), &repository(), RetryPolicy::new(50), false)
            .await
            .unwrap_err();

        assert_eq!(deployer.call_count(), 10);
        assert!(error.to_string().contains("E1"));
        assert!(error.to_string().contains("10 attempt(s)"));
    }

    #[tokio::test]
    async fn test_attachments_without_main_file() {
        let dir = TempDir::new().unwrap();
        let mut unit = jar_unit(&dir);
        unit.primary_file = None;
        let deployer = Arc::new(ScriptedDeployer::default());

        let error = BatchPublisher::new(deployer.clone())
            .publish(&unit, &repository(), RetryPolicy::new(3), false)
            .await
            .unwrap_err();

        assert!(error.to_string().contains("Change packaging to 'pom'"));
        assert_eq!(deployer.call_count(), 0);
    }

    #[tokio::test]
    async fn test_pom_unit_deploys_descriptor() {
        let dir = TempDir::new().unwrap();
        let descriptor = dir.path().join("pom.xml");
        let unit = BuildUnit::new("com.example", "parent", "1.0", "pom", &descriptor);
        let deployer = Arc::new(ScriptedDeployer::default());

        BatchPublisher::new(deployer.clone())
            .publish(&unit, &repository(), RetryPolicy::default(), false)
            .await
            .unwrap();

        let calls = deployer.calls.lock().unwrap();
        assert_eq!(calls[0].1.len(), 1);
        assert_eq!(calls[0].1[0].file, descriptor);
        assert_eq!(calls[0].1[0].coordinates.extension, "pom");
        assert!(calls[0].1[0].metadata.is_empty());
    }
}
