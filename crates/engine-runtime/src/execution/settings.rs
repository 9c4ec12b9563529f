use engine_config::ImportConfig;
use model::store::LivenessThresholds;
use std::time::Duration;

/// The subset of the configuration the executor acts on.
#[derive(Debug, Clone)]
pub struct ExecutorSettings {
    pub table: String,
    pub shard_id: i32,
    pub switch_mode_interval: Duration,
    pub thresholds: LivenessThresholds,
}

impl ExecutorSettings {
    pub fn from_config(config: &ImportConfig) -> Self {
        Self {
            table: config.table.clone(),
            shard_id: config.shard_id,
            switch_mode_interval: config.switch_mode_interval(),
            thresholds: config.thresholds(),
        }
    }
}
