//! Session state shared by the host build system

use crate::build::unit::BuildUnit;
use crate::core::error::DeployError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Error channel of a build session
///
/// Anything pushed here makes the overall build report failure.
#[derive(Debug, Default)]
pub struct SessionResult {
    failures: Vec<DeployError>,
}

impl SessionResult {
    pub fn add_failure(&mut self, error: DeployError) {
        self.failures.push(error);
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn failures(&self) -> &[DeployError] {
        &self.failures
    }
}

/// One multi-module build session
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct BuildSession {
    /// Goals requested on the command line, in order
    #[serde(default)]
    pub goals: Vec<String>,
    /// Build units in dependency order (dependencies first)
    #[serde(default)]
    pub projects: Vec<BuildUnit>,
    /// `group:artifact` of the top-level unit; the first unit when absent
    #[serde(default)]
    pub top_level: Option<String>,
    #[serde(default)]
    pub offline: bool,
    #[serde(default)]
    pub user_properties: BTreeMap<String, String>,
    #[serde(default)]
    pub system_properties: BTreeMap<String, String>,
    #[serde(skip)]
    pub result: SessionResult,
}

impl BuildSession {
    pub fn new(goals: Vec<String>, projects: Vec<BuildUnit>) -> Self {
        Self {
            goals,
            projects,
            ..Default::default()
        }
    }

    pub fn goals_contain(&self, goal: &str) -> bool {
        self.goals.iter().any(|g| g == goal)
    }

    pub fn top_level_project(&self) -> Option<&BuildUnit> {
        match &self.top_level {
            Some(key) => self.projects.iter().find(|p| &p.key() == key),
            None => self.projects.first(),
        }
    }
}
