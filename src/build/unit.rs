//! Build units and their plugin wiring

use crate::build::artifact::{
    ArtifactCoordinates, ArtifactMetadata, AttachedArtifact, PublishableArtifact,
    is_snapshot_version,
};
use crate::core::error::DeployError;
use crate::repository::RepositoryDescriptor;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use tracing::warn;

/// Packaging kind whose descriptor is the artifact
pub const POM_PACKAGING: &str = "pom";

/// Group id of the platform's built-in plugins
pub const PLATFORM_PLUGIN_GROUP: &str = "org.apache.maven.plugins";

/// Identity of a build plugin (group id + artifact id)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PluginKey {
    pub group_id: String,
    pub artifact_id: String,
}

impl PluginKey {
    pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
        }
    }

    /// The built-in step that copies outputs to local storage
    pub fn install_plugin() -> Self {
        Self::new(PLATFORM_PLUGIN_GROUP, "maven-install-plugin")
    }

    /// The built-in step that uploads outputs to a remote repository
    pub fn deploy_plugin() -> Self {
        Self::new(PLATFORM_PLUGIN_GROUP, "maven-deploy-plugin")
    }
}

impl fmt::Display for PluginKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)
    }
}

/// One configured execution of a plugin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginExecution {
    #[serde(default = "default_execution_id")]
    pub id: String,
    #[serde(default)]
    pub goals: Vec<String>,
}

fn default_execution_id() -> String {
    "default".to_string()
}

impl PluginExecution {
    /// Remove a goal, returning whether it was present
    pub fn remove_goal(&mut self, goal: &str) -> bool {
        let before = self.goals.len();
        self.goals.retain(|g| g != goal);
        self.goals.len() != before
    }
}

/// A plugin wired into a unit's build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildPlugin {
    #[serde(flatten)]
    pub key: PluginKey,
    #[serde(default)]
    pub executions: Vec<PluginExecution>,
}

/// One module of the build graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildUnit {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    #[serde(default = "default_packaging")]
    pub packaging: String,
    /// The unit's descriptor file (POM)
    pub descriptor_file: PathBuf,
    /// Main output, absent until packaged
    #[serde(default)]
    pub primary_file: Option<PathBuf>,
    #[serde(default)]
    pub attached: Vec<AttachedArtifact>,
    #[serde(default)]
    pub plugins: Vec<BuildPlugin>,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    /// Repository declared by the unit for distribution
    #[serde(default)]
    pub distribution_repository: Option<RepositoryDescriptor>,
}

fn default_packaging() -> String {
    "jar".to_string()
}

impl BuildUnit {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
        packaging: impl Into<String>,
        descriptor_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
            packaging: packaging.into(),
            descriptor_file: descriptor_file.into(),
            primary_file: None,
            attached: Vec::new(),
            plugins: Vec::new(),
            properties: BTreeMap::new(),
            distribution_repository: None,
        }
    }

    /// `group:artifact:version`
    pub fn id(&self) -> String {
        format!("{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }

    /// `group:artifact`, stable across versions
    pub fn key(&self) -> String {
        format!("{}:{}", self.group_id, self.artifact_id)
    }

    pub fn is_snapshot(&self) -> bool {
        is_snapshot_version(&self.version)
    }

    pub fn is_pom(&self) -> bool {
        self.packaging == POM_PACKAGING
    }

    /// Extension of the main artifact for this packaging
    pub fn primary_extension(&self) -> &str {
        match self.packaging.as_str() {
            "maven-plugin" | "ejb" | "bundle" | "java-source" | "javadoc" => "jar",
            other => other,
        }
    }

    pub fn primary_coordinates(&self) -> ArtifactCoordinates {
        ArtifactCoordinates::new(
            &self.group_id,
            &self.artifact_id,
            &self.version,
            self.primary_extension(),
        )
    }

    /// Build the artifact collection to install or deploy for this unit
    ///
    /// The primary artifact comes first: the packaged file, or the
    /// descriptor for `pom` units. Attached artifacts follow in declaration
    /// order. With a repository every artifact is stamped with its id.
    ///
    /// Fails when a non-`pom` unit has no main file on disk, because either
    /// it only attached files (it should be `pom`) or packaging assigned
    /// nothing at all.
    pub fn publishable_artifacts(
        &self,
        repository: Option<&RepositoryDescriptor>,
        update_release_info: bool,
    ) -> Result<Vec<PublishableArtifact>, DeployError> {
        let repository_id = repository.map(|r| r.id.clone());

        let primary = if self.is_pom() {
            PublishableArtifact {
                coordinates: self.primary_coordinates(),
                file: self.descriptor_file.clone(),
                metadata: Vec::new(),
                release: update_release_info,
                repository: repository_id.clone(),
            }
        } else {
            let file = self
                .primary_file
                .as_ref()
                .filter(|f| f.is_file())
                .ok_or_else(|| self.missing_primary_error())?;

            PublishableArtifact {
                coordinates: self.primary_coordinates(),
                file: file.clone(),
                metadata: vec![ArtifactMetadata::ProjectDescriptor {
                    path: self.descriptor_file.clone(),
                }],
                release: update_release_info,
                repository: repository_id.clone(),
            }
        };

        let mut artifacts = Vec::with_capacity(1 + self.attached.len());
        artifacts.push(primary);

        for attached in &self.attached {
            let stamp = if attached.legacy && repository_id.is_some() {
                warn!(
                    "{} has been attached with deprecated code, try to upgrade the responsible plugin",
                    attached.coordinates
                );
                None
            } else {
                repository_id.clone()
            };

            artifacts.push(PublishableArtifact {
                coordinates: attached.coordinates.clone(),
                file: attached.file.clone(),
                metadata: Vec::new(),
                release: false,
                repository: stamp,
            });
        }

        Ok(artifacts)
    }

    fn missing_primary_error(&self) -> DeployError {
        let reason = if self.attached.is_empty() {
            "The packaging for this project did not assign a file to the build artifact"
        } else {
            "The packaging plugin for this project did not assign a main file to the project \
             but it has attachments. Change packaging to 'pom'."
        };

        DeployError::InvalidUnitArtifact {
            unit: self.id(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn jar_unit(dir: &TempDir) -> BuildUnit {
        let jar = dir.path().join("core-1.0.jar");
        std::fs::write(&jar, b"jar").unwrap();

        let mut unit = BuildUnit::new(
            "com.example",
            "core",
            "1.0",
            "jar",
            dir.path().join("pom.xml"),
        );
        unit.primary_file = Some(jar);
        unit
    }

    fn sources_of(unit: &BuildUnit, dir: &TempDir) -> AttachedArtifact {
        AttachedArtifact {
            coordinates: unit.primary_coordinates().with_classifier("sources"),
            file: dir.path().join("core-1.0-sources.jar"),
            legacy: false,
        }
    }

    #[test]
    fn test_jar_unit_primary_then_attached() {
        let dir = TempDir::new().unwrap();
        let mut unit = jar_unit(&dir);
        unit.attached.push(sources_of(&unit, &dir));
        let repository = RepositoryDescriptor::new("releases", "http://example/releases");

        let artifacts = unit.publishable_artifacts(Some(&repository), true).unwrap();

        assert_eq!(artifacts.len(), 2);
        assert_eq!(artifacts[0].coordinates.extension, "jar");
        assert!(artifacts[0].release);
        assert_eq!(
            artifacts[0].metadata,
            vec![ArtifactMetadata::ProjectDescriptor {
                path: dir.path().join("pom.xml")
            }]
        );
        assert_eq!(artifacts[1].coordinates.classifier.as_deref(), Some("sources"));
        assert!(!artifacts[1].release);
        assert!(
            artifacts
                .iter()
                .all(|a| a.repository.as_deref() == Some("releases"))
        );
    }

    #[test]
    fn test_pom_unit_uses_descriptor_as_primary() {
        let unit = BuildUnit::new("com.example", "parent", "1.0", "pom", "/work/pom.xml");

        let artifacts = unit.publishable_artifacts(None, false).unwrap();

        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].file, PathBuf::from("/work/pom.xml"));
        assert_eq!(artifacts[0].coordinates.extension, "pom");
        assert!(artifacts[0].metadata.is_empty());
        assert!(artifacts[0].repository.is_none());
    }

    #[test]
    fn test_missing_primary_with_attachments_is_rejected() {
        let dir = TempDir::new().unwrap();
        let mut unit = jar_unit(&dir);
        unit.primary_file = None;
        unit.attached.push(sources_of(&unit, &dir));

        let error = unit.publishable_artifacts(None, false).unwrap_err();

        assert_eq!(error.code(), "INVALID_UNIT_ARTIFACT");
        assert!(error.to_string().contains("Change packaging to 'pom'"));
    }

    #[test]
    fn test_missing_primary_without_attachments_is_rejected() {
        let dir = TempDir::new().unwrap();
        let mut unit = jar_unit(&dir);
        unit.primary_file = Some(dir.path().join("classes"));
        std::fs::create_dir(dir.path().join("classes")).unwrap();

        let error = unit.publishable_artifacts(None, false).unwrap_err();

        assert!(error.to_string().contains("did not assign a file"));
    }

    #[test]
    fn test_legacy_attachment_is_not_stamped() {
        let dir = TempDir::new().unwrap();
        let mut unit = jar_unit(&dir);
        let mut sources = sources_of(&unit, &dir);
        sources.legacy = true;
        unit.attached.push(sources);
        let repository = RepositoryDescriptor::new("releases", "http://example/releases");

        let artifacts = unit.publishable_artifacts(Some(&repository), false).unwrap();

        assert_eq!(artifacts.len(), 2);
        assert_eq!(artifacts[0].repository.as_deref(), Some("releases"));
        assert!(artifacts[1].repository.is_none());
    }

    #[test]
    fn test_primary_extension() {
        let plugin = BuildUnit::new("g", "a", "1", "maven-plugin", "pom.xml");
        assert_eq!(plugin.primary_extension(), "jar");

        let war = BuildUnit::new("g", "a", "1", "war", "pom.xml");
        assert_eq!(war.primary_extension(), "war");
    }

    #[test]
    fn test_execution_remove_goal() {
        let mut execution = PluginExecution {
            id: "default-deploy".to_string(),
            goals: vec!["deploy".to_string(), "help".to_string()],
        };

        assert!(execution.remove_goal("deploy"));
        assert!(!execution.remove_goal("deploy"));
        assert_eq!(execution.goals, vec!["help".to_string()]);
    }
}
