use crate::{
    connectors::backend::{Backend, ClosedEngine, EngineWriter, OpenedEngine},
    error::BackendError,
};
use async_trait::async_trait;
use model::{core::identifiers::EngineTag, records::kv::Rows};
use std::{
    collections::HashSet,
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};
use tracing::{debug, info, warn};

const DATA_TREE: &str = "data";

/// Bulk-load backend staging rows in per-engine sled trees.
///
/// Each open engine owns a tree named after its engine id. Import copies the
/// staged rows into the shared `data` tree in one batch; cleanup drops the
/// staging tree.
///
/// A shard is busy only while an engine handle for it is alive in this
/// process. A staging tree with no live owner (a run that failed before
/// cleanup, or a killed process) is dropped by the next `open_engine`.
pub struct SledBackend {
    db: sled::Db,
    live: Arc<Mutex<HashSet<String>>>,
}

impl SledBackend {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, BackendError> {
        let db = sled::open(path)?;
        Ok(Self {
            db,
            live: Arc::default(),
        })
    }

    /// Stable engine id for a table shard.
    fn engine_id(tag: &EngineTag) -> String {
        let hash = blake3::hash(tag.to_string().as_bytes());
        format!("eng-{}", &hash.to_hex()[..16])
    }

    fn has_tree(&self, name: &str) -> bool {
        self.db
            .tree_names()
            .iter()
            .any(|n| &n[..] == name.as_bytes())
    }

    /// Whether a staging engine for this shard still holds resources.
    pub fn is_staged(&self, table: &str, shard_id: i32) -> bool {
        self.has_tree(&Self::engine_id(&EngineTag::new(table, shard_id)))
    }

    /// Reads a key from the live data.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, BackendError> {
        let data = self.db.open_tree(DATA_TREE)?;
        Ok(data.get(key)?.map(|v| v.to_vec()))
    }

    /// Number of keys in the live data.
    pub fn len(&self) -> Result<usize, BackendError> {
        Ok(self.db.open_tree(DATA_TREE)?.len())
    }

    pub fn is_empty(&self) -> Result<bool, BackendError> {
        Ok(self.len()? == 0)
    }
}

#[async_trait]
impl Backend for SledBackend {
    async fn open_engine(
        &self,
        table: &str,
        shard_id: i32,
    ) -> Result<Box<dyn OpenedEngine>, BackendError> {
        let tag = EngineTag::new(table, shard_id);
        let lease = EngineLease::acquire(&self.live, Self::engine_id(&tag))
            .ok_or_else(|| BackendError::EngineBusy(tag.to_string()))?;

        if self.has_tree(&lease.id) {
            warn!(engine = %lease.id, tag = %tag, "Dropping leftover staging tree");
            self.db.drop_tree(lease.id.as_bytes())?;
        }

        let staging = self.db.open_tree(&lease.id)?;
        debug!(engine = %lease.id, tag = %tag, "Staging engine opened");

        Ok(Box::new(SledEngine {
            db: self.db.clone(),
            lease,
            staging,
        }))
    }
}

/// Marks an engine id as owned until dropped.
struct EngineLease {
    id: String,
    live: Arc<Mutex<HashSet<String>>>,
}

fn lock_live(live: &Mutex<HashSet<String>>) -> MutexGuard<'_, HashSet<String>> {
    // the set stays consistent even if a holder panicked
    live.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl EngineLease {
    fn acquire(live: &Arc<Mutex<HashSet<String>>>, id: String) -> Option<Self> {
        if !lock_live(live).insert(id.clone()) {
            return None;
        }
        Some(Self {
            id,
            live: live.clone(),
        })
    }
}

impl Drop for EngineLease {
    fn drop(&mut self) {
        lock_live(&self.live).remove(&self.id);
    }
}

struct SledEngine {
    db: sled::Db,
    lease: EngineLease,
    staging: sled::Tree,
}

#[async_trait]
impl OpenedEngine for SledEngine {
    fn id(&self) -> &str {
        &self.lease.id
    }

    async fn local_writer(&self) -> Result<Box<dyn EngineWriter>, BackendError> {
        Ok(Box::new(SledWriter {
            staging: self.staging.clone(),
            written: 0,
        }))
    }

    async fn close(self: Box<Self>) -> Result<Box<dyn ClosedEngine>, BackendError> {
        let SledEngine { db, lease, staging } = *self;
        staging.flush()?;
        debug!(engine = %lease.id, staged = staging.len(), "Staging engine closed");

        Ok(Box::new(SledClosedEngine { db, lease, staging }))
    }
}

struct SledWriter {
    staging: sled::Tree,
    written: usize,
}

#[async_trait]
impl EngineWriter for SledWriter {
    async fn write_rows(&mut self, rows: &Rows) -> Result<(), BackendError> {
        let mut batch = sled::Batch::default();
        for (index, pair) in rows.iter().enumerate() {
            if pair.key.is_empty() {
                return Err(BackendError::RejectedRow {
                    index: self.written + index,
                    reason: "empty key".to_string(),
                });
            }
            batch.insert(pair.key.as_slice(), pair.value.as_slice());
        }

        self.staging.apply_batch(batch)?;
        self.written += rows.len();
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<(), BackendError> {
        self.staging.flush()?;
        Ok(())
    }
}

struct SledClosedEngine {
    db: sled::Db,
    lease: EngineLease,
    staging: sled::Tree,
}

#[async_trait]
impl ClosedEngine for SledClosedEngine {
    async fn import(&mut self) -> Result<(), BackendError> {
        let data = self.db.open_tree(DATA_TREE)?;
        let mut batch = sled::Batch::default();
        let mut count = 0usize;

        for item in self.staging.iter() {
            let (key, value) = item?;
            batch.insert(key, value);
            count += 1;
        }

        data.apply_batch(batch)?;
        data.flush()?;
        info!(engine = %self.lease.id, rows = count, "Engine imported");
        Ok(())
    }

    async fn cleanup(self: Box<Self>) -> Result<(), BackendError> {
        self.db.drop_tree(self.lease.id.as_bytes())?;
        debug!(engine = %self.lease.id, "Staging engine cleaned up");
        Ok(())
    }
}
