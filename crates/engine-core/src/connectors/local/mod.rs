//! Single-process implementations of the cluster collaborators.

pub mod directory;
pub mod sled_backend;

pub use directory::{StaticStoreDirectory, StoreEntry};
pub use sled_backend::SledBackend;
