pub mod build;
pub mod core;
pub mod lifecycle;
pub mod orchestration;
pub mod plugins;
pub mod repository;
pub mod security;

pub use self::core::*;
pub use orchestration::{DeferredDeployer, SessionOutcome, SessionReport};
pub use security::RepositoryCredentials;
