//! Orchestration layer for deferred deployment
//!
//! This module provides the high-level components that install and deploy
//! every build unit of a session once the whole build has finished.

pub mod accumulator;
pub mod batch_publisher;
pub mod deferred_deployer;
pub mod project_installer;

// Re-export main types for convenience
pub use accumulator::ArtifactAccumulator;
pub use batch_publisher::BatchPublisher;
pub use deferred_deployer::{DeferredDeployer, FailureLatch, SessionOutcome, SessionReport};
pub use project_installer::ProjectInstaller;
