pub mod lifecycle_guard;

pub use lifecycle_guard::LifecycleGuard;
