//! Configuration loader for the deferred deployer
//!
//! Properties come from three layers. The first layer that defines a key
//! wins:
//! 1. User properties (`-Dkey=value` on the command line)
//! 2. System properties (including the `DEPLOYER_*` environment variables)
//! 3. Properties of the top-level project

use super::config::*;
use crate::build::BuildSession;
use crate::core::error::DeployError;
use crate::core::retry::RetryPolicy;
use crate::repository::RepositoryOverrides;
use std::collections::{BTreeMap, HashMap};

/// Environment variables mapped onto property keys
const ENV_PROPERTIES: &[(&str, &str)] = &[
    ("DEPLOYER_ALT_DEPLOYMENT_REPOSITORY", ALT_DEPLOYMENT_REPOSITORY),
    (
        "DEPLOYER_ALT_SNAPSHOT_DEPLOYMENT_REPOSITORY",
        ALT_SNAPSHOT_DEPLOYMENT_REPOSITORY,
    ),
    (
        "DEPLOYER_ALT_RELEASE_DEPLOYMENT_REPOSITORY",
        ALT_RELEASE_DEPLOYMENT_REPOSITORY,
    ),
    (
        "DEPLOYER_RETRY_FAILED_DEPLOYMENT_COUNT",
        RETRY_FAILED_DEPLOYMENT_COUNT,
    ),
    ("DEPLOYER_SKIP", SKIP),
    ("DEPLOYER_UPDATE_RELEASE_INFO", UPDATE_RELEASE_INFO),
];

/// Property layers in priority order
#[derive(Debug, Clone, Copy)]
pub struct PropertyLayers<'a> {
    pub user: &'a BTreeMap<String, String>,
    pub system: &'a BTreeMap<String, String>,
    pub project: Option<&'a BTreeMap<String, String>>,
}

impl<'a> PropertyLayers<'a> {
    /// Layers of a build session, with the top-level project as fallback
    pub fn of(session: &'a BuildSession) -> Self {
        Self {
            user: &session.user_properties,
            system: &session.system_properties,
            project: session.top_level_project().map(|unit| &unit.properties),
        }
    }

    /// First value defined for `key`
    pub fn get(&self, key: &str) -> Option<&'a str> {
        self.user
            .get(key)
            .or_else(|| self.system.get(key))
            .or_else(|| self.project.and_then(|p| p.get(key)))
            .map(String::as_str)
    }
}

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load the deployer configuration of a session
    pub fn load(
        session: &BuildSession,
        deploy_requested: bool,
    ) -> Result<DeployerConfig, DeployError> {
        Self::from_layers(&PropertyLayers::of(session), deploy_requested)
    }

    /// Build the configuration from explicit property layers
    ///
    /// The skip flag is read first; when set, no other key is parsed. The
    /// retry count is only parsed when `deploy_requested`.
    pub fn from_layers(
        layers: &PropertyLayers<'_>,
        deploy_requested: bool,
    ) -> Result<DeployerConfig, DeployError> {
        let skip = match layers.get(SKIP) {
            Some(value) => Self::parse_bool(SKIP, value)?,
            None => false,
        };
        if skip {
            return Ok(DeployerConfig {
                skip,
                ..Default::default()
            });
        }

        let overrides = RepositoryOverrides {
            generic: layers.get(ALT_DEPLOYMENT_REPOSITORY).map(str::to_string),
            snapshot: layers
                .get(ALT_SNAPSHOT_DEPLOYMENT_REPOSITORY)
                .map(str::to_string),
            release: layers
                .get(ALT_RELEASE_DEPLOYMENT_REPOSITORY)
                .map(str::to_string),
        };

        let retry = match layers.get(RETRY_FAILED_DEPLOYMENT_COUNT) {
            Some(value) if deploy_requested => {
                Self::parse_retry(RETRY_FAILED_DEPLOYMENT_COUNT, value)?
            }
            _ => RetryPolicy::default(),
        };

        let update_release_info = match layers.get(UPDATE_RELEASE_INFO) {
            Some(value) => Self::parse_bool(UPDATE_RELEASE_INFO, value)?,
            None => false,
        };

        Ok(DeployerConfig {
            overrides,
            retry,
            skip,
            update_release_info,
        })
    }

    /// Translate `DEPLOYER_*` environment variables into property keys
    ///
    /// Takes the environment as a map so callers decide where it comes from.
    pub fn env_properties(env: &HashMap<String, String>) -> BTreeMap<String, String> {
        ENV_PROPERTIES
            .iter()
            .filter_map(|(var, key)| env.get(*var).map(|value| (key.to_string(), value.clone())))
            .collect()
    }

    /// Parse a boolean-like property
    ///
    /// A bare flag (`-Dkey` with an empty value) counts as `true`.
    pub fn parse_bool(key: &str, value: &str) -> Result<bool, DeployError> {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if trimmed.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(DeployError::InvalidProperty {
                key: key.to_string(),
                value: value.to_string(),
            })
        }
    }

    /// Parse an attempt count; out-of-range values are clamped, not rejected
    pub fn parse_retry(key: &str, value: &str) -> Result<RetryPolicy, DeployError> {
        value
            .trim()
            .parse::<i64>()
            .map(RetryPolicy::new)
            .map_err(|_| DeployError::InvalidProperty {
                key: key.to_string(),
                value: value.to_string(),
            })
    }
}
