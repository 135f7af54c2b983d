//! Artifact identities and the files that back them

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Suffix marking a mutable pre-release version
pub const SNAPSHOT_VERSION: &str = "SNAPSHOT";

lazy_static! {
    /// Timestamped snapshot, e.g. `1.0-20240101.120000-3`
    static ref TIMESTAMPED_SNAPSHOT: Regex =
        Regex::new(r"^(.*)-([0-9]{8}\.[0-9]{6})-([0-9]+)$").unwrap();
}

/// Check whether a version string denotes a snapshot
///
/// A version is a snapshot when it ends in `SNAPSHOT` (any case) or has the
/// timestamped `-yyyyMMdd.HHmmss-build` form.
///
/// # Examples
///
/// ```
/// use deferred_deployer::build::is_snapshot_version;
///
/// assert!(is_snapshot_version("1.0.0-SNAPSHOT"));
/// assert!(is_snapshot_version("1.0.0-20240101.120000-3"));
/// assert!(!is_snapshot_version("1.0.0"));
/// ```
pub fn is_snapshot_version(version: &str) -> bool {
    let ends_with_snapshot = version.len() >= SNAPSHOT_VERSION.len()
        && version.is_char_boundary(version.len() - SNAPSHOT_VERSION.len())
        && version[version.len() - SNAPSHOT_VERSION.len()..].eq_ignore_ascii_case(SNAPSHOT_VERSION);

    ends_with_snapshot || TIMESTAMPED_SNAPSHOT.is_match(version)
}

/// Full identity of a single artifact
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactCoordinates {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
    pub extension: String,
}

impl ArtifactCoordinates {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
            classifier: None,
            extension: extension.into(),
        }
    }

    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = Some(classifier.into());
        self
    }

    pub fn is_snapshot(&self) -> bool {
        is_snapshot_version(&self.version)
    }

    /// File name inside the default repository layout
    pub fn file_name(&self) -> String {
        match &self.classifier {
            Some(classifier) => format!(
                "{}-{}-{}.{}",
                self.artifact_id, self.version, classifier, self.extension
            ),
            None => format!("{}-{}.{}", self.artifact_id, self.version, self.extension),
        }
    }
}

impl fmt::Display for ArtifactCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.extension)?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{}", classifier)?;
        }
        write!(f, ":{}", self.version)
    }
}

/// Secondary output attached to a build unit (sources, javadoc, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachedArtifact {
    pub coordinates: ArtifactCoordinates,
    pub file: PathBuf,
    /// Attached through an outdated API and cannot carry a repository stamp
    #[serde(default)]
    pub legacy: bool,
}

/// Metadata document travelling with an artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArtifactMetadata {
    /// The authoritative descriptor (POM) of the owning unit
    ProjectDescriptor { path: PathBuf },
}

/// An artifact ready for one install or deploy call
///
/// Built fresh from [`crate::build::BuildUnit`] data for every publish call and
/// never modified between retries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishableArtifact {
    pub coordinates: ArtifactCoordinates,
    pub file: PathBuf,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metadata: Vec<ArtifactMetadata>,
    #[serde(default)]
    pub release: bool,
    /// Id of the repository this artifact is stamped for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
}
