//! Build graph model supplied by the host build system

pub mod artifact;
pub mod events;
pub mod session;
pub mod unit;

pub use artifact::{
    ArtifactCoordinates, ArtifactMetadata, AttachedArtifact, PublishableArtifact,
    SNAPSHOT_VERSION, is_snapshot_version,
};
pub use events::{ExecutionEvent, Outcome, RepositoryEvent, TransferStage};
pub use session::{BuildSession, SessionResult};
pub use unit::{BuildPlugin, BuildUnit, POM_PACKAGING, PluginExecution, PluginKey};
