//! Events emitted by the host build system

use crate::build::artifact::ArtifactCoordinates;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Outcome carried by per-project, fork and mojo events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Started,
    Succeeded,
    Failed,
    Skipped,
}

/// Lifecycle event of a build session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExecutionEvent {
    ProjectDiscoveryStarted,
    SessionStarted,
    SessionEnded,
    /// A build unit of the reactor
    Project { project: String, outcome: Outcome },
    /// A forked lifecycle
    Fork { outcome: Outcome },
    /// A build unit inside a forked lifecycle
    ForkedProject { project: String, outcome: Outcome },
    /// A single plugin goal execution
    Mojo {
        project: String,
        goal: String,
        outcome: Outcome,
    },
}

impl ExecutionEvent {
    /// Whether this event reports a failure that must block publishing
    pub fn is_failure(&self) -> bool {
        match self {
            Self::Project { outcome, .. }
            | Self::Fork { outcome }
            | Self::ForkedProject { outcome, .. }
            | Self::Mojo { outcome, .. } => *outcome == Outcome::Failed,
            Self::ProjectDiscoveryStarted | Self::SessionStarted | Self::SessionEnded => false,
        }
    }
}

/// Stage of a low-level repository transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferStage {
    Resolving,
    Resolved,
    Downloading,
    Downloaded,
    Installing,
    Installed,
    Deploying,
    Deployed,
}

/// Low-level event of the host's repository subsystem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RepositoryEvent {
    Artifact {
        stage: TransferStage,
        artifact: ArtifactCoordinates,
    },
    Metadata {
        stage: TransferStage,
        path: PathBuf,
    },
    ArtifactDescriptorInvalid { artifact: ArtifactCoordinates },
    ArtifactDescriptorMissing { artifact: ArtifactCoordinates },
    MetadataInvalid { path: PathBuf },
}
