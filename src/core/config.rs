//! Configuration keys and the resolved deployer configuration

use crate::core::retry::RetryPolicy;
use crate::repository::RepositoryOverrides;
use serde::{Deserialize, Serialize};

/// Generic alternative repository (`id::url`)
pub const ALT_DEPLOYMENT_REPOSITORY: &str = "altDeploymentRepository";

/// Alternative repository for snapshot versions (`id::url`)
pub const ALT_SNAPSHOT_DEPLOYMENT_REPOSITORY: &str = "altSnapshotDeploymentRepository";

/// Alternative repository for release versions (`id::url`)
pub const ALT_RELEASE_DEPLOYMENT_REPOSITORY: &str = "altReleaseDeploymentRepository";

/// Attempts per unit deployment, clamped to [1, 10]
pub const RETRY_FAILED_DEPLOYMENT_COUNT: &str = "retryFailedDeploymentCount";

/// Skip the deferred install/deploy pass entirely
pub const SKIP: &str = "deployer.skip";

/// Mark primary artifacts as releases
pub const UPDATE_RELEASE_INFO: &str = "updateReleaseInfo";

/// Effective configuration of one session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployerConfig {
    #[serde(default)]
    pub overrides: RepositoryOverrides,
    #[serde(default)]
    pub retry: RetryPolicy,
    #[serde(default)]
    pub skip: bool,
    #[serde(default)]
    pub update_release_info: bool,
}
