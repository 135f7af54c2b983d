//! Project Installer - Installs one build unit into local storage

use crate::build::BuildUnit;
use crate::core::{ArtifactInstaller, DeployError};
use std::sync::Arc;
use tracing::{debug, info};

pub struct ProjectInstaller {
    installer: Arc<dyn ArtifactInstaller>,
}

impl ProjectInstaller {
    pub fn new(installer: Arc<dyn ArtifactInstaller>) -> Self {
        Self { installer }
    }

    /// Install the unit's primary and attached artifacts in one call
    ///
    /// Validation happens before the installer is touched. Installs are not
    /// retried.
    pub async fn install(
        &self,
        unit: &BuildUnit,
        update_release_info: bool,
    ) -> Result<(), DeployError> {
        let artifacts = unit.publishable_artifacts(None, update_release_info)?;

        info!("Installing {} ({} artifact(s))", unit.id(), artifacts.len());
        for artifact in &artifacts {
            debug!("  {} <- {}", artifact.coordinates, artifact.file.display());
        }

        self.installer
            .install(&artifacts)
            .await
            .map_err(|source| DeployError::InstallationFailed {
                unit: unit.id(),
                source,
            })
    }
}
