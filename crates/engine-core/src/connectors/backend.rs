//! Bulk-load engine contract.
//!
//! The lifecycle is linear and enforced by ownership:
//! `Backend::open_engine` -> [`OpenedEngine`] -> `local_writer` ->
//! [`EngineWriter`] (write, close) -> `OpenedEngine::close` ->
//! [`ClosedEngine`] (import, cleanup).

use crate::error::BackendError;
use async_trait::async_trait;
use model::records::kv::Rows;

#[async_trait]
pub trait Backend: Send + Sync {
    /// Allocates a staging engine for one table shard.
    async fn open_engine(
        &self,
        table: &str,
        shard_id: i32,
    ) -> Result<Box<dyn OpenedEngine>, BackendError>;
}

/// Staging engine accepting writes.
#[async_trait]
pub trait OpenedEngine: Send {
    /// Engine identifier, for logging.
    fn id(&self) -> &str;

    async fn local_writer(&self) -> Result<Box<dyn EngineWriter>, BackendError>;

    /// Finalizes staging. Every writer must be closed first.
    async fn close(self: Box<Self>) -> Result<Box<dyn ClosedEngine>, BackendError>;
}

/// Sequential write handle bound to an opened engine.
#[async_trait]
pub trait EngineWriter: Send {
    async fn write_rows(&mut self, rows: &Rows) -> Result<(), BackendError>;

    /// Flushes buffered rows. Can fail even if every write succeeded.
    async fn close(self: Box<Self>) -> Result<(), BackendError>;
}

/// Finalized engine ready to be ingested into the live store.
#[async_trait]
pub trait ClosedEngine: Send {
    async fn import(&mut self) -> Result<(), BackendError>;

    /// Releases staging resources. Does not roll back ingested data.
    async fn cleanup(self: Box<Self>) -> Result<(), BackendError>;
}
