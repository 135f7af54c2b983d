//! Repository credentials with memory-safe handling and masking
//!
//! Passwords are held as `secrecy::SecretString` so they never show up in
//! `Debug` output or log lines.

use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::env;
use std::fmt;

/// Environment variable holding the repository user name
pub const USERNAME_VAR: &str = "DEPLOYER_USERNAME";

/// Environment variable holding the repository password or token
pub const PASSWORD_VAR: &str = "DEPLOYER_PASSWORD";

/// Basic credentials for a remote repository
///
/// # Examples
///
/// ```
/// use deferred_deployer::security::RepositoryCredentials;
/// use secrecy::ExposeSecret;
///
/// let credentials = RepositoryCredentials::new("deployer", "s3cr3t-password");
/// assert_eq!(credentials.password().expose_secret(), "s3cr3t-password");
/// assert!(!format!("{:?}", credentials).contains("s3cr3t"));
/// ```
pub struct RepositoryCredentials {
    username: String,
    password: SecretString,
}

impl RepositoryCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        let password: String = password.into();
        Self {
            username: username.into(),
            password: SecretString::new(password.into()),
        }
    }

    /// Read credentials from `DEPLOYER_USERNAME` / `DEPLOYER_PASSWORD`
    ///
    /// Returns `None` unless both are set.
    pub fn from_env() -> Option<Self> {
        let vars: HashMap<String, String> = [USERNAME_VAR, PASSWORD_VAR]
            .iter()
            .filter_map(|name| env::var(name).ok().map(|value| (name.to_string(), value)))
            .collect();
        Self::from_vars(&vars)
    }

    /// Same as [`RepositoryCredentials::from_env`] over an explicit map
    pub fn from_vars(vars: &HashMap<String, String>) -> Option<Self> {
        let username = vars.get(USERNAME_VAR)?;
        let password = vars.get(PASSWORD_VAR)?;
        Some(Self::new(username.clone(), password.clone()))
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &SecretString {
        &self.password
    }

    /// Masked password for log lines
    pub fn masked_password(&self) -> String {
        mask_secret(self.password.expose_secret())
    }
}

impl fmt::Debug for RepositoryCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepositoryCredentials")
            .field("username", &self.username)
            .field("password", &self.masked_password())
            .finish()
    }
}

/// Masks a secret for safe logging
///
/// Shows only the first 3 and last 3 characters. Secrets shorter than 10
/// characters are fully masked as "****".
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() < 10 {
        return "****".to_string();
    }

    let prefix: String = chars[..3].iter().collect();
    let suffix: String = chars[chars.len() - 3..].iter().collect();
    format!("{}...{}", prefix, suffix)
}
