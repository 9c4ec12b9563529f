use engine_config::ConfigError;
use engine_core::error::BackendError;
use engine_processing::error::ImportError;
use thiserror::Error;

/// Top-level errors of an import run.
#[derive(Debug, Error)]
pub enum RunError {
    /// Configuration or TLS material could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The backend could not be initialized.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// A pipeline step failed. The cluster has already been switched back to
    /// normal mode when this is returned.
    #[error(transparent)]
    Import(#[from] ImportError),

    #[error("Shutdown requested before the import started")]
    ShutdownRequested,
}
