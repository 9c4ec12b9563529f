use crate::error::DirectoryError;
use async_trait::async_trait;
use model::store::{Store, StoreState, SwitchMode};

/// Cluster membership view and per-store mode control.
#[async_trait]
pub trait StoreDirectory: Send + Sync {
    /// Lists every store whose state is at or above `min_state`.
    ///
    /// Always reflects membership at the time of the call; an empty list is
    /// not an error.
    async fn list_stores(&self, min_state: StoreState) -> Result<Vec<Store>, DirectoryError>;

    /// Asks a single store to switch its ingest mode. Idempotent.
    async fn switch_mode(&self, address: &str, mode: SwitchMode) -> Result<(), DirectoryError>;
}
