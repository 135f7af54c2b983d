//! Error handling for deferred deployment
//!
//! This module provides the error taxonomy of the end-of-session pass with
//! recovery guidance, using the thiserror crate for ergonomic error handling.

use thiserror::Error;

/// Failure reported by an install or deploy transport
///
/// Transports are external collaborators, so the payload is only the
/// human-readable cause.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct TransferError {
    message: String,
}

impl TransferError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<std::io::Error> for TransferError {
    fn from(error: std::io::Error) -> Self {
        Self::new(error.to_string())
    }
}

/// Broad classes of [`DeployError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad override syntax, offline session, unparsable property
    Configuration,
    /// No destination repository could be determined
    Resolution,
    /// A build unit's outputs cannot be published as declared
    Validation,
    /// The transport failed, after all retries were used up
    Transfer,
}

/// Main error type for the deferred install/deploy pass
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeployError {
    // Configuration errors
    #[error("Invalid syntax for alternative repository '{value}'. Use \"id::url\".")]
    InvalidRepositorySyntax { value: String },

    #[error("Cannot deploy artifacts when the build session is offline")]
    OfflineMode,

    #[error("Invalid value '{value}' for property '{key}'")]
    InvalidProperty { key: String, value: String },

    #[error("No transport available for repository URL '{url}'")]
    UnsupportedTransport { url: String },

    // Resolution errors
    #[error(
        "Deployment failed: no repository was declared by the project and no alternative repository \
         (altDeploymentRepository=id::url) was given"
    )]
    NoRepositoryConfigured,

    // Validation errors
    #[error("[{unit}] {reason}")]
    InvalidUnitArtifact { unit: String, reason: String },

    // Transfer errors
    #[error("[{unit}] installation failed: {source}")]
    InstallationFailed {
        unit: String,
        #[source]
        source: TransferError,
    },

    #[error("[{unit}] deployment failed after {attempts} attempt(s): {source}")]
    DeploymentFailed {
        unit: String,
        attempts: u32,
        #[source]
        source: TransferError,
    },
}

impl DeployError {
    /// Get the category of this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidRepositorySyntax { .. }
            | Self::OfflineMode
            | Self::InvalidProperty { .. }
            | Self::UnsupportedTransport { .. } => ErrorCategory::Configuration,
            Self::NoRepositoryConfigured => ErrorCategory::Resolution,
            Self::InvalidUnitArtifact { .. } => ErrorCategory::Validation,
            Self::InstallationFailed { .. } | Self::DeploymentFailed { .. } => {
                ErrorCategory::Transfer
            }
        }
    }

    /// Get the build unit associated with this error, if any
    pub fn unit(&self) -> Option<&str> {
        match self {
            Self::InvalidUnitArtifact { unit, .. }
            | Self::InstallationFailed { unit, .. }
            | Self::DeploymentFailed { unit, .. } => Some(unit),
            _ => None,
        }
    }

    /// Check if running the session again may succeed without changing anything
    ///
    /// Only transfer failures qualify; everything else needs a configuration or
    /// build change first.
    pub fn is_recoverable(&self) -> bool {
        self.category() == ErrorCategory::Transfer
    }

    /// Get suggested actions for this error
    pub fn suggested_actions(&self) -> Vec<&'static str> {
        match self {
            Self::InvalidRepositorySyntax { .. } => vec![
                "Use the form id::url, for example releases::https://repo.example.com/releases",
                "Check altDeploymentRepository, altSnapshotDeploymentRepository and altReleaseDeploymentRepository",
            ],
            Self::OfflineMode => vec!["Run the build without offline mode to deploy"],
            Self::InvalidProperty { .. } => vec!["Check the property value for typos"],
            Self::UnsupportedTransport { .. } => {
                vec!["Use a file://, http:// or https:// repository URL"]
            }
            Self::NoRepositoryConfigured => vec![
                "Declare a distribution repository in the top-level project",
                "Or pass -DaltDeploymentRepository=id::url",
            ],
            Self::InvalidUnitArtifact { .. } => vec![
                "Make sure the packaging step produced the main artifact",
                "Change packaging to 'pom' if the module only attaches artifacts",
            ],
            Self::InstallationFailed { .. } => vec![
                "Check that the local repository is writable",
                "Check free disk space",
            ],
            Self::DeploymentFailed { .. } => vec![
                "Check network connectivity and repository credentials",
                "Raise retryFailedDeploymentCount (at most 10)",
            ],
        }
    }

    /// Get error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidRepositorySyntax { .. } => "INVALID_REPOSITORY_SYNTAX",
            Self::OfflineMode => "OFFLINE_MODE",
            Self::InvalidProperty { .. } => "INVALID_PROPERTY",
            Self::UnsupportedTransport { .. } => "UNSUPPORTED_TRANSPORT",
            Self::NoRepositoryConfigured => "NO_REPOSITORY_CONFIGURED",
            Self::InvalidUnitArtifact { .. } => "INVALID_UNIT_ARTIFACT",
            Self::InstallationFailed { .. } => "INSTALLATION_FAILED",
            Self::DeploymentFailed { .. } => "DEPLOYMENT_FAILED",
        }
    }
}
