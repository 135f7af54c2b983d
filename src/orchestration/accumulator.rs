//! Artifact Accumulator - Records every artifact installed during a session
//!
//! Registered as a repository listener. Module builds may run on several
//! threads, so recording goes through a mutex.

use crate::build::{ArtifactCoordinates, RepositoryEvent, TransferStage};
use crate::core::RepositoryListener;
use std::sync::{Mutex, MutexGuard};

/// Thread-safe, insertion-ordered list of installed artifacts
#[derive(Debug, Default)]
pub struct ArtifactAccumulator {
    installed: Mutex<Vec<ArtifactCoordinates>>,
}

impl ArtifactAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event; only artifact-installed notifications are kept
    pub fn record(&self, event: &RepositoryEvent) {
        if let RepositoryEvent::Artifact {
            stage: TransferStage::Installed,
            artifact,
        } = event
        {
            self.entries().push(artifact.clone());
        }
    }

    /// Point-in-time copy in recording order, duplicates included
    pub fn snapshot(&self) -> Vec<ArtifactCoordinates> {
        self.entries().clone()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Discard every entry
    pub fn clear(&self) {
        self.entries().clear();
    }

    // A panic in another listener must not lose what was recorded so far.
    fn entries(&self) -> MutexGuard<'_, Vec<ArtifactCoordinates>> {
        self.installed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl RepositoryListener for ArtifactAccumulator {
    fn on_repository_event(&self, event: &RepositoryEvent) {
        self.record(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Arc;

    fn artifact(id: &str) -> ArtifactCoordinates {
        ArtifactCoordinates::new("com.example", id, "1.0", "jar")
    }

    fn event(stage: TransferStage, id: &str) -> RepositoryEvent {
        RepositoryEvent::Artifact {
            stage,
            artifact: artifact(id),
        }
    }

    #[test]
    fn test_records_only_installed_artifacts() {
        let accumulator = ArtifactAccumulator::new();

        accumulator.record(&event(TransferStage::Downloaded, "a"));
        accumulator.record(&event(TransferStage::Resolved, "a"));
        accumulator.record(&event(TransferStage::Installing, "a"));
        accumulator.record(&event(TransferStage::Installed, "a"));
        accumulator.record(&event(TransferStage::Deployed, "a"));
        accumulator.record(&RepositoryEvent::Metadata {
            stage: TransferStage::Installed,
            path: PathBuf::from("maven-metadata.xml"),
        });
        accumulator.record(&RepositoryEvent::ArtifactDescriptorMissing {
            artifact: artifact("b"),
        });

        assert_eq!(accumulator.snapshot(), vec![artifact("a")]);
    }

    #[test]
    fn test_snapshot_keeps_order_and_duplicates() {
        let accumulator = ArtifactAccumulator::new();

        accumulator.record(&event(TransferStage::Installed, "a"));
        accumulator.record(&event(TransferStage::Installed, "b"));
        accumulator.record(&event(TransferStage::Installed, "a"));

        assert_eq!(
            accumulator.snapshot(),
            vec![artifact("a"), artifact("b"), artifact("a")]
        );
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let accumulator = ArtifactAccumulator::new();
        accumulator.record(&event(TransferStage::Installed, "a"));

        let snapshot = accumulator.snapshot();
        accumulator.record(&event(TransferStage::Installed, "b"));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(accumulator.len(), 2);
    }

    #[test]
    fn test_clear() {
        let accumulator = ArtifactAccumulator::new();
        accumulator.record(&event(TransferStage::Installed, "a"));

        accumulator.clear();

        assert!(accumulator.is_empty());
    }

    #[test]
    fn test_concurrent_recording() {
        let accumulator = Arc::new(ArtifactAccumulator::new());

        let handles: Vec<_> = (0..8)
            .map(|thread| {
                let accumulator = Arc::clone(&accumulator);
                std::thread::spawn(move || {
                    for i in 0..100 {
                        accumulator
                            .on_repository_event(&event(TransferStage::Installed, &format!("t{thread}-{i}")));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = accumulator.snapshot();
        assert_eq!(snapshot.len(), 800);

        // Per-thread order survives interleaving
        let thread_zero: Vec<_> = snapshot
            .iter()
            .filter(|a| a.artifact_id.starts_with("t0-"))
            .map(|a| a.artifact_id.clone())
            .collect();
        let expected: Vec<_> = (0..100).map(|i| format!("t0-{i}")).collect();
        assert_eq!(thread_zero, expected);
    }
}
