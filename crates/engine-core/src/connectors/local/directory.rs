use crate::{connectors::directory::StoreDirectory, error::DirectoryError};
use async_trait::async_trait;
use futures::lock::Mutex;
use model::store::{Store, StoreState, SwitchMode};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct StoreEntry {
    pub store: Store,
    /// Refuse every mode switch, simulating an unresponsive node.
    pub reject_switch: bool,
}

impl StoreEntry {
    pub fn new(address: impl Into<String>, state: StoreState) -> Self {
        Self {
            store: Store::new(address, state),
            reject_switch: false,
        }
    }

    pub fn rejecting(mut self) -> Self {
        self.reject_switch = true;
        self
    }
}

/// Store directory backed by a fixed membership list.
pub struct StaticStoreDirectory {
    entries: Vec<StoreEntry>,
    modes: Mutex<HashMap<String, SwitchMode>>,
}

impl StaticStoreDirectory {
    pub fn new(entries: Vec<StoreEntry>) -> Self {
        Self {
            entries,
            modes: Mutex::new(HashMap::new()),
        }
    }

    /// Last mode successfully applied to `address`, if any.
    pub async fn mode_of(&self, address: &str) -> Option<SwitchMode> {
        self.modes.lock().await.get(address).copied()
    }
}

#[async_trait]
impl StoreDirectory for StaticStoreDirectory {
    async fn list_stores(&self, min_state: StoreState) -> Result<Vec<Store>, DirectoryError> {
        Ok(self
            .entries
            .iter()
            .filter(|e| e.store.state >= min_state)
            .map(|e| e.store.clone())
            .collect())
    }

    async fn switch_mode(&self, address: &str, mode: SwitchMode) -> Result<(), DirectoryError> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.store.address == address)
            .ok_or_else(|| DirectoryError::UnknownStore(address.to_string()))?;

        if entry.reject_switch {
            return Err(DirectoryError::Rejected {
                address: address.to_string(),
                mode,
                reason: "store refused the request".to_string(),
            });
        }

        let previous = self.modes.lock().await.insert(address.to_string(), mode);
        debug!(store = %address, mode = %mode, previous = ?previous, "Store mode switched");
        Ok(())
    }
}
