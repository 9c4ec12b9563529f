use crate::{error::ConfigError, security::SecurityConfig, validator::ConfigValidator};
use model::{
    records::object::DbRef,
    store::{LivenessThresholds, StoreState},
};
use serde::Deserialize;
use std::{
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::info;

pub const DEFAULT_TABLE: &str = "default_table";
pub const DEFAULT_SWITCH_MODE_INTERVAL_MS: u64 = 5 * 60 * 1000;

/// Everything one import run needs, as read from a TOML file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImportConfig {
    /// How often the background ticker re-asserts import mode.
    #[serde(default = "default_switch_mode_interval_ms")]
    pub switch_mode_interval_ms: u64,

    #[serde(default = "default_min_state_for_import")]
    pub min_state_for_import: StoreState,

    #[serde(default = "default_min_state_for_normal")]
    pub min_state_for_normal: StoreState,

    #[serde(default = "default_table")]
    pub table: String,

    #[serde(default)]
    pub shard_id: i32,

    #[serde(default)]
    pub db: DbRef,

    #[serde(default)]
    pub security: SecurityConfig,

    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub stores: Vec<StoreConfig>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Sled-backed staging on the local disk.
    #[default]
    Local,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    #[serde(default)]
    pub kind: BackendKind,

    /// Data directory. Defaults to `~/.bulkload/data`.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    pub address: String,

    #[serde(default = "default_store_state")]
    pub state: StoreState,

    #[serde(default)]
    pub reject_switch: bool,
}

fn default_switch_mode_interval_ms() -> u64 {
    DEFAULT_SWITCH_MODE_INTERVAL_MS
}

fn default_min_state_for_import() -> StoreState {
    LivenessThresholds::default().import
}

fn default_min_state_for_normal() -> StoreState {
    LivenessThresholds::default().normal
}

fn default_table() -> String {
    DEFAULT_TABLE.to_string()
}

fn default_store_state() -> StoreState {
    StoreState::Normal
}

impl ImportConfig {
    /// Reads, parses and validates a configuration file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let config = Self::from_toml(&source)?;
        info!(path = %path.display(), stores = config.stores.len(), "Loaded import configuration");
        Ok(config)
    }

    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        let config: ImportConfig = toml::from_str(source)?;
        ConfigValidator::new(&config).validate()?;
        Ok(config)
    }

    pub fn switch_mode_interval(&self) -> Duration {
        Duration::from_millis(self.switch_mode_interval_ms)
    }

    pub fn thresholds(&self) -> LivenessThresholds {
        LivenessThresholds::new(self.min_state_for_import, self.min_state_for_normal)
    }

    pub fn backend_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.backend.path {
            Some(path) => Ok(path.clone()),
            None => {
                let home = dirs::home_dir().ok_or(ConfigError::HomeDirUnavailable)?;
                Ok(home.join(".bulkload/data"))
            }
        }
    }
}
