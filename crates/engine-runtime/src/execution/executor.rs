use crate::{
    error::RunError,
    execution::{factory, settings::ExecutorSettings, ticker::ModeTicker},
};
use chrono::{DateTime, Utc};
use engine_config::ImportConfig;
use engine_core::{
    connectors::{backend::Backend, directory::StoreDirectory},
    metrics::{Metrics, MetricsSnapshot},
};
use engine_processing::{import::ImportPipeline, mode::ModeSwitcher};
use model::{core::identifiers::RunId, records::kv::Rows, store::SwitchMode};
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Builds the collaborators from `config` and runs one import.
pub async fn run(
    config: &ImportConfig,
    rows: &Rows,
    cancel: CancellationToken,
) -> Result<ImportSummary, RunError> {
    let directory = factory::create_directory(config);
    let backend = factory::create_backend(config).await?;

    ImportExecutor::new(
        ExecutorSettings::from_config(config),
        directory,
        backend,
        cancel,
    )
    .execute(rows)
    .await
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct ImportSummary {
    pub run_id: RunId,
    pub table: String,
    pub shard_id: i32,
    pub rows: usize,
    pub bytes: usize,
    pub duration_ms: u64,
    pub started_at: DateTime<Utc>,
    pub metrics: MetricsSnapshot,
}

/// Runs the import pipeline while keeping the cluster in import mode.
pub struct ImportExecutor {
    run_id: RunId,
    settings: ExecutorSettings,
    switcher: ModeSwitcher,
    pipeline: ImportPipeline,
    metrics: Metrics,
    cancel: CancellationToken,
}

impl ImportExecutor {
    pub fn new(
        settings: ExecutorSettings,
        directory: Arc<dyn StoreDirectory>,
        backend: Arc<dyn Backend>,
        cancel: CancellationToken,
    ) -> Self {
        let metrics = Metrics::new();
        Self {
            run_id: RunId::generate(),
            switcher: ModeSwitcher::new(directory, settings.thresholds, metrics.clone()),
            pipeline: ImportPipeline::new(backend, metrics.clone()),
            settings,
            metrics,
            cancel,
        }
    }

    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Runs the import.
    ///
    /// Order: start the import-mode ticker, assert import mode once, run the
    /// pipeline, stop the ticker, assert normal mode once. The last two steps
    /// happen whatever the pipeline outcome; a pipeline error is returned
    /// only after the cluster has been switched back.
    pub async fn execute(&self, rows: &Rows) -> Result<ImportSummary, RunError> {
        if self.cancel.is_cancelled() {
            warn!(run_id = %self.run_id, "Shutdown requested before import started");
            return Err(RunError::ShutdownRequested);
        }

        let started_at = Utc::now();
        let table = self.settings.table.as_str();
        let shard_id = self.settings.shard_id;
        info!(run_id = %self.run_id, table, shard_id, rows = rows.len(), "Starting import run");

        let ticker = ModeTicker::spawn(
            self.switcher.clone(),
            self.settings.switch_mode_interval,
            SwitchMode::Import,
            &self.cancel,
        );
        self.switcher.assert_mode(SwitchMode::Import).await;

        let outcome = self.pipeline.run(table, shard_id, rows).await;

        ticker.stop();
        self.switcher.assert_mode(SwitchMode::Normal).await;

        let stats = match outcome {
            Ok(stats) => stats,
            Err(e) => {
                error!(run_id = %self.run_id, step = %e.step(), "Import run failed, cluster switched back to normal mode");
                return Err(e.into());
            }
        };

        let summary = ImportSummary {
            run_id: self.run_id.clone(),
            table: table.to_string(),
            shard_id,
            rows: stats.rows,
            bytes: stats.bytes,
            duration_ms: stats.duration.as_millis() as u64,
            started_at,
            metrics: self.metrics.snapshot(),
        };
        info!(
            run_id = %self.run_id,
            rows = summary.rows,
            duration_ms = summary.duration_ms,
            "Import run completed"
        );
        Ok(summary)
    }
}
