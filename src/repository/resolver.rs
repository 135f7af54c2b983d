//! Repository Resolver - Picks the deployment repository for a session
//!
//! Resolution order (high to low):
//! 1. Override for the version kind (snapshot or release)
//! 2. Generic override
//! 3. Repository declared by the project
//!
//! Override strings use the `id::url` syntax. A malformed override is an
//! error even if the project declares a repository.

use crate::core::error::DeployError;
use crate::repository::descriptor::RepositoryDescriptor;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref ALT_REPO_SYNTAX: Regex = Regex::new(r"^(.+)::(.+)$").unwrap();
}

/// Alternative repositories given through properties
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryOverrides {
    /// Applies to every version kind
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,
}

impl RepositoryOverrides {
    /// The override that applies to the given version kind, if any
    pub fn effective(&self, is_snapshot: bool) -> Option<&str> {
        let specific = if is_snapshot {
            self.snapshot.as_deref()
        } else {
            self.release.as_deref()
        };

        specific.or(self.generic.as_deref())
    }
}

/// Stateless repository resolution
pub struct RepositoryResolver;

impl RepositoryResolver {
    /// Resolve the deployment repository
    ///
    /// # Examples
    ///
    /// ```
    /// use deferred_deployer::repository::{RepositoryOverrides, RepositoryResolver};
    ///
    /// let overrides = RepositoryOverrides {
    ///     generic: Some("Repo::http://example/repo".to_string()),
    ///     ..Default::default()
    /// };
    ///
    /// let repository = RepositoryResolver::resolve(false, &overrides, None).unwrap();
    /// assert_eq!(repository.id, "Repo");
    /// assert_eq!(repository.url, "http://example/repo");
    /// ```
    pub fn resolve(
        is_snapshot: bool,
        overrides: &RepositoryOverrides,
        project_default: Option<&RepositoryDescriptor>,
    ) -> Result<RepositoryDescriptor, DeployError> {
        match overrides.effective(is_snapshot) {
            Some(value) => Self::parse_override(value),
            None => project_default
                .cloned()
                .ok_or(DeployError::NoRepositoryConfigured),
        }
    }

    /// Parse an `id::url` override
    pub fn parse_override(value: &str) -> Result<RepositoryDescriptor, DeployError> {
        let invalid = || DeployError::InvalidRepositorySyntax {
            value: value.to_string(),
        };

        let captures = ALT_REPO_SYNTAX.captures(value).ok_or_else(invalid)?;
        let id = captures[1].trim();
        let url = captures[2].trim();

        if id.is_empty() || url.is_empty() {
            return Err(invalid());
        }

        Ok(RepositoryDescriptor::new(id, url))
    }
}
