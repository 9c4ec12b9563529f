use engine_core::error::BackendError;
use std::fmt;
use thiserror::Error;

/// Lifecycle step of an import, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStep {
    OpenEngine,
    AcquireWriter,
    WriteRows,
    CloseWriter,
    CloseEngine,
    Import,
    Cleanup,
}

impl ImportStep {
    pub fn as_str(self) -> &'static str {
        match self {
            ImportStep::OpenEngine => "open engine",
            ImportStep::AcquireWriter => "acquire writer",
            ImportStep::WriteRows => "write rows",
            ImportStep::CloseWriter => "close writer",
            ImportStep::CloseEngine => "close engine",
            ImportStep::Import => "import",
            ImportStep::Cleanup => "cleanup",
        }
    }
}

impl fmt::Display for ImportStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal failure of an import, naming the step that failed.
#[derive(Error, Debug)]
#[error("Import step '{step}' failed for table '{table}' shard {shard_id}: {source}")]
pub struct ImportError {
    pub step: ImportStep,
    pub table: String,
    pub shard_id: i32,
    #[source]
    pub source: BackendError,
}

impl ImportError {
    pub fn new(step: ImportStep, table: &str, shard_id: i32, source: BackendError) -> Self {
        Self {
            step,
            table: table.to_string(),
            shard_id,
            source,
        }
    }

    pub fn step(&self) -> ImportStep {
        self.step
    }
}
