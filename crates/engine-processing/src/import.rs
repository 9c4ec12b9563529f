use crate::error::{ImportError, ImportStep};
use engine_core::{connectors::backend::Backend, error::BackendError, metrics::Metrics};
use model::records::kv::Rows;
use std::{sync::Arc, time::Duration};
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportStats {
    pub rows: usize,
    pub bytes: usize,
    pub duration: Duration,
}

/// Drives one staging engine through open, write, finalize, import and cleanup.
///
/// Steps run strictly in order and the first failure stops the pipeline,
/// except for a failed import, which still releases the staging engine
/// before the error is returned. Nothing is retried here.
pub struct ImportPipeline {
    backend: Arc<dyn Backend>,
    metrics: Metrics,
}

impl ImportPipeline {
    pub fn new(backend: Arc<dyn Backend>, metrics: Metrics) -> Self {
        Self { backend, metrics }
    }

    pub async fn run(
        &self,
        table: &str,
        shard_id: i32,
        rows: &Rows,
    ) -> Result<ImportStats, ImportError> {
        let start = std::time::Instant::now();
        let fail = |step: ImportStep, source: BackendError| {
            error!(table, shard_id, step = %step, error = %source, "Import step failed");
            ImportError::new(step, table, shard_id, source)
        };

        let engine = self
            .backend
            .open_engine(table, shard_id)
            .await
            .map_err(|e| fail(ImportStep::OpenEngine, e))?;
        info!(table, shard_id, engine = engine.id(), "Engine opened");

        let mut writer = engine
            .local_writer()
            .await
            .map_err(|e| fail(ImportStep::AcquireWriter, e))?;

        writer
            .write_rows(rows)
            .await
            .map_err(|e| fail(ImportStep::WriteRows, e))?;

        writer
            .close()
            .await
            .map_err(|e| fail(ImportStep::CloseWriter, e))?;
        info!(table, shard_id, rows = rows.len(), "Rows staged");

        let mut closed = engine
            .close()
            .await
            .map_err(|e| fail(ImportStep::CloseEngine, e))?;

        let imported = closed.import().await;
        if imported.is_ok() {
            // rows count as written once they reached the live store
            self.metrics.increment_rows(rows.len() as u64);
            self.metrics.increment_bytes(rows.size_bytes() as u64);
        }
        let cleaned = closed.cleanup().await;
        match (imported, cleaned) {
            (Ok(()), Ok(())) => {}
            (Ok(()), Err(e)) => return Err(fail(ImportStep::Cleanup, e)),
            (Err(e), Ok(())) => return Err(fail(ImportStep::Import, e)),
            (Err(e), Err(cleanup_err)) => {
                warn!(table, shard_id, error = %cleanup_err, "Cleanup after failed import also failed");
                return Err(fail(ImportStep::Import, e));
            }
        }

        let stats = ImportStats {
            rows: rows.len(),
            bytes: rows.size_bytes(),
            duration: start.elapsed(),
        };
        info!(
            table,
            shard_id,
            rows = stats.rows,
            bytes = stats.bytes,
            duration_ms = stats.duration.as_millis() as u64,
            "Import completed"
        );
        Ok(stats)
    }
}
