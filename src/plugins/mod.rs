pub mod filesystem_repository;
pub mod http_repository;
pub mod transport_loader;

pub use filesystem_repository::FileSystemRepository;
pub use http_repository::HttpRepository;
pub use transport_loader::{TransportLoader, TransportScheme};
