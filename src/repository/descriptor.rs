//! Destination repository descriptors

use crate::build::artifact::ArtifactCoordinates;
use serde::{Deserialize, Serialize};

/// Directory layout of a repository
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepositoryLayout {
    /// `group/as/path/artifact/version/artifact-version[-classifier].ext`
    #[default]
    Default,
}

impl RepositoryLayout {
    /// Relative path of an artifact inside the repository
    ///
    /// # Examples
    ///
    /// ```
    /// use deferred_deployer::build::ArtifactCoordinates;
    /// use deferred_deployer::repository::RepositoryLayout;
    ///
    /// let coordinates = ArtifactCoordinates::new("com.example", "core", "1.0", "jar");
    /// assert_eq!(
    ///     RepositoryLayout::Default.path_of(&coordinates),
    ///     "com/example/core/1.0/core-1.0.jar"
    /// );
    /// ```
    pub fn path_of(&self, coordinates: &ArtifactCoordinates) -> String {
        match self {
            Self::Default => format!(
                "{}/{}/{}/{}",
                coordinates.group_id.replace('.', "/"),
                coordinates.artifact_id,
                coordinates.version,
                coordinates.file_name()
            ),
        }
    }
}

/// Update and checksum policy for one kind of version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryPolicy {
    pub enabled: bool,
    pub update_policy: String,
    pub checksum_policy: String,
}

impl Default for RepositoryPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            update_policy: "daily".to_string(),
            checksum_policy: "warn".to_string(),
        }
    }
}

/// Where a batch of artifacts is deployed to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryDescriptor {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub layout: RepositoryLayout,
    #[serde(default)]
    pub releases: RepositoryPolicy,
    #[serde(default)]
    pub snapshots: RepositoryPolicy,
    /// Whether snapshots get timestamped unique file names
    #[serde(default)]
    pub unique_snapshots: bool,
}

impl RepositoryDescriptor {
    /// Descriptor with the default layout and policies
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            layout: RepositoryLayout::Default,
            releases: RepositoryPolicy::default(),
            snapshots: RepositoryPolicy::default(),
            unique_snapshots: false,
        }
    }

    /// Absolute location of an artifact in this repository
    pub fn artifact_url(&self, coordinates: &ArtifactCoordinates) -> String {
        format!(
            "{}/{}",
            self.url.trim_end_matches('/'),
            self.layout.path_of(coordinates)
        )
    }
}
