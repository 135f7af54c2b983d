//! Deferred Deployer - Main orchestrator of the end-of-session pass
//!
//! Lifecycle:
//! 1. Session start: disable the built-in per-module install and deploy steps
//! 2. Module builds: latch any failure
//! 3. Session end: install every unit, then deploy every unit when `deploy`
//!    was requested, unless a module failed or the user opted out

use crate::build::{
    ArtifactCoordinates, BuildSession, BuildUnit, ExecutionEvent, PluginKey,
};
use crate::core::{
    ArtifactDeployer, ArtifactInstaller, ConfigLoader, DeployError, DeployerConfig,
    SessionState, SessionStateMachine, StateTransition,
};
use crate::lifecycle::LifecycleGuard;
use crate::orchestration::accumulator::ArtifactAccumulator;
use crate::orchestration::batch_publisher::BatchPublisher;
use crate::orchestration::project_installer::ProjectInstaller;
use crate::repository::{RepositoryDescriptor, RepositoryResolver};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Name shown in the version banner
pub const EXTENSION_NAME: &str = env!("CARGO_PKG_NAME");

/// Version shown in the version banner
pub const EXTENSION_VERSION: &str = env!("CARGO_PKG_VERSION");

const INSTALL_GOAL: &str = "install";
const DEPLOY_GOAL: &str = "deploy";

/// Shared "a module failed" flag
///
/// Set once, never cleared within a session. Cloning shares the flag, so
/// host failure callbacks can latch it from any thread.
#[derive(Debug, Clone, Default)]
pub struct FailureLatch(Arc<AtomicBool>);

impl FailureLatch {
    pub fn latch(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_latched(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// What the end-of-session pass did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionOutcome {
    /// Session has not ended yet
    Pending,
    /// A module failed earlier in the session
    SkippedPriorFailure,
    /// The skip property was set
    SkippedByUser,
    /// Units were installed, deploy was not requested
    Installed,
    /// Units were installed and deployed
    Deployed,
    /// A fatal error was attached to the session
    Failed,
}

/// Summary of one session
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub session_id: Uuid,
    pub outcome: SessionOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    /// Artifacts seen installed during the session, in order
    pub installed: Vec<ArtifactCoordinates>,
    /// Ids of the units deployed, in order
    pub deployed: Vec<String>,
    pub transitions: Vec<StateTransition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Per-session orchestrator
pub struct DeferredDeployer {
    installer: ProjectInstaller,
    publisher: BatchPublisher,
    accumulator: Arc<ArtifactAccumulator>,
    failure: FailureLatch,
    state: SessionStateMachine,
    outcome: SessionOutcome,
    repository: Option<String>,
    installed: Vec<ArtifactCoordinates>,
    deployed: Vec<String>,
    error: Option<String>,
}

impl DeferredDeployer {
    /// Create an orchestrator over the given transports
    ///
    /// The accumulator should be registered as a repository listener with
    /// whatever performs the installs; see [`DeferredDeployer::accumulator`].
    pub fn new(
        installer: Arc<dyn ArtifactInstaller>,
        deployer: Arc<dyn ArtifactDeployer>,
        accumulator: Arc<ArtifactAccumulator>,
    ) -> Self {
        log_version_banner();

        Self {
            installer: ProjectInstaller::new(installer),
            publisher: BatchPublisher::new(deployer),
            accumulator,
            failure: FailureLatch::default(),
            state: SessionStateMachine::new(),
            outcome: SessionOutcome::Pending,
            repository: None,
            installed: Vec::new(),
            deployed: Vec::new(),
            error: None,
        }
    }

    pub fn accumulator(&self) -> Arc<ArtifactAccumulator> {
        Arc::clone(&self.accumulator)
    }

    pub fn failure_latch(&self) -> FailureLatch {
        self.failure.clone()
    }

    pub fn state(&self) -> SessionState {
        self.state.get_state()
    }

    pub fn report(&self) -> SessionReport {
        SessionReport {
            session_id: self.state.session_id(),
            outcome: self.outcome,
            repository: self.repository.clone(),
            installed: self.installed.clone(),
            deployed: self.deployed.clone(),
            transitions: self.state.get_history().to_vec(),
            error: self.error.clone(),
        }
    }

    /// Handle one lifecycle event of the host
    ///
    /// Fatal problems are attached to `session.result`; nothing is returned
    /// to the host directly.
    pub async fn on_event(&mut self, session: &mut BuildSession, event: &ExecutionEvent) {
        match event {
            ExecutionEvent::SessionStarted => self.session_started(session),
            ExecutionEvent::SessionEnded => self.session_ended(session).await,
            event if event.is_failure() => {
                debug!("Some failure has occurred: {:?}", event);
                self.failure.latch();
            }
            ExecutionEvent::ProjectDiscoveryStarted
            | ExecutionEvent::Project { .. }
            | ExecutionEvent::Fork { .. }
            | ExecutionEvent::ForkedProject { .. }
            | ExecutionEvent::Mojo { .. } => {}
        }
    }

    fn session_started(&mut self, session: &mut BuildSession) {
        self.state.transition(SessionState::Started, None);

        let steps = [
            (PluginKey::deploy_plugin(), DEPLOY_GOAL),
            (PluginKey::install_plugin(), INSTALL_GOAL),
        ];
        for (owner, goal) in &steps {
            if LifecycleGuard::contains_step_goal(&session.projects, owner, goal) {
                LifecycleGuard::suppress_default_step(&mut session.projects, owner, goal);
            }
        }
    }

    async fn session_ended(&mut self, session: &mut BuildSession) {
        log_version_banner();

        let mut metadata = HashMap::new();
        metadata.insert(
            "units".to_string(),
            serde_json::Value::from(session.projects.len()),
        );
        self.state.transition(SessionState::Ended, Some(metadata));

        let result = self.run_deferred_pass(session).await;
        self.accumulator.clear();

        match result {
            Ok(outcome) => self.outcome = outcome,
            Err(err) => {
                error!("{}", err);
                for action in err.suggested_actions() {
                    info!("  - {}", action);
                }
                self.outcome = SessionOutcome::Failed;
                self.error = Some(err.to_string());
                session.result.add_failure(err);
            }
        }
    }

    async fn run_deferred_pass(
        &mut self,
        session: &BuildSession,
    ) -> Result<SessionOutcome, DeployError> {
        if self.failure.is_latched() {
            warn!("The deferred deployer will not be called based on previous errors.");
            return Ok(SessionOutcome::SkippedPriorFailure);
        }

        let deploy_requested = session.goals_contain(DEPLOY_GOAL);
        if session.offline && deploy_requested {
            return Err(DeployError::OfflineMode);
        }

        let config = ConfigLoader::load(session, deploy_requested)?;
        if config.skip {
            info!("Skipping deferred install and deploy");
            return Ok(SessionOutcome::SkippedByUser);
        }

        let repository = if deploy_requested {
            let repository = Self::resolve_repository(session, &config)?;
            self.repository = Some(repository.id.clone());
            Some(repository)
        } else {
            None
        };

        info!("");
        info!("Installing artifacts...");
        let installed = self.install_units(session, &config).await;
        // Units installed before a failure are still in local storage
        self.installed = self.accumulator.snapshot();
        installed?;

        let Some(repository) = repository else {
            return Ok(SessionOutcome::Installed);
        };

        info!("");
        info!("Deploying artifacts...");
        for unit in &session.projects {
            self.publish_unit(unit, &repository, &config).await?;
        }

        Ok(SessionOutcome::Deployed)
    }

    async fn install_units(
        &self,
        session: &BuildSession,
        config: &DeployerConfig,
    ) -> Result<(), DeployError> {
        for unit in &session.projects {
            self.installer
                .install(unit, config.update_release_info)
                .await?;
        }
        Ok(())
    }

    async fn publish_unit(
        &mut self,
        unit: &BuildUnit,
        repository: &RepositoryDescriptor,
        config: &DeployerConfig,
    ) -> Result<(), DeployError> {
        self.publisher
            .publish(unit, repository, config.retry, config.update_release_info)
            .await?;
        self.deployed.push(unit.id());
        Ok(())
    }

    /// The destination follows the top-level project's version kind
    fn resolve_repository(
        session: &BuildSession,
        config: &DeployerConfig,
    ) -> Result<RepositoryDescriptor, DeployError> {
        let top_level = session.top_level_project();
        let is_snapshot = top_level.is_some_and(BuildUnit::is_snapshot);
        let project_default = top_level.and_then(|unit| unit.distribution_repository.as_ref());

        if let Some(value) = config.overrides.effective(is_snapshot) {
            info!("Using alternate deployment repository {}", value);
        }

        RepositoryResolver::resolve(is_snapshot, &config.overrides, project_default)
    }
}

fn log_version_banner() {
    info!("");
    info!(" --- {}:{} --- ", EXTENSION_NAME, EXTENSION_VERSION);
}
