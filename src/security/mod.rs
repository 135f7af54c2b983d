pub mod credentials;

pub use credentials::{RepositoryCredentials, mask_secret};
