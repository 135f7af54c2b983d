//! Deployment repository descriptors and resolution

pub mod descriptor;
pub mod resolver;

pub use descriptor::{RepositoryDescriptor, RepositoryLayout, RepositoryPolicy};
pub use resolver::{RepositoryOverrides, RepositoryResolver};
