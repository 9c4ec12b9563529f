use crate::error::RunError;
use engine_config::{ImportConfig, config::BackendKind, security::TlsMaterial};
use engine_core::{
    connectors::{
        backend::Backend,
        directory::StoreDirectory,
        local::{SledBackend, StaticStoreDirectory, StoreEntry},
    },
    metrics::Metrics,
};
use engine_processing::mode::ModeSwitcher;
use model::store::Store;
use std::sync::Arc;
use tracing::{info, warn};

pub fn create_directory(config: &ImportConfig) -> Arc<dyn StoreDirectory> {
    let entries = config
        .stores
        .iter()
        .map(|s| StoreEntry {
            store: Store::new(s.address.clone(), s.state),
            reject_switch: s.reject_switch,
        })
        .collect();
    Arc::new(StaticStoreDirectory::new(entries))
}

pub fn create_mode_switcher(config: &ImportConfig, metrics: Metrics) -> ModeSwitcher {
    ModeSwitcher::new(create_directory(config), config.thresholds(), metrics)
}

/// Opens the configured backend. Fails before any cluster coordination starts.
pub async fn create_backend(config: &ImportConfig) -> Result<Arc<dyn Backend>, RunError> {
    let tls = TlsMaterial::load(&config.security).await?;

    match config.backend.kind {
        BackendKind::Local => {
            if tls.is_some() {
                warn!("TLS material is configured but not used by the local backend");
            }
            let path = config.backend_path()?;
            info!(path = %path.display(), "Opening local backend");
            Ok(Arc::new(SledBackend::open(&path)?))
        }
    }
}
