pub mod config;
pub mod config_loader;
pub mod error;
pub mod retry;
pub mod state_machine;
pub mod traits;

pub use config::DeployerConfig;
pub use config_loader::{ConfigLoader, PropertyLayers};
pub use error::*;
pub use retry::*;
pub use state_machine::*;
pub use traits::*;
