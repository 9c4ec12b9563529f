use model::store::SwitchMode;
use thiserror::Error;

/// Errors reported by a store directory.
#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("Store '{0}' is not known to the directory")]
    UnknownStore(String),

    #[error("Store '{address}' rejected switch to {mode} mode: {reason}")]
    Rejected {
        address: String,
        mode: SwitchMode,
        reason: String,
    },

    #[error("Store directory unavailable: {0}")]
    Unavailable(String),

    #[error("Unexpected error: {0}")]
    Unexpected(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Errors reported by a bulk-load backend.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Engine '{0}' is already open")]
    EngineBusy(String),

    #[error("Rejected row at index {index}: {reason}")]
    RejectedRow { index: usize, reason: String },

    #[error("Sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("Backend error: {0}")]
    Other(String),
}
