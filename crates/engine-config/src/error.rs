use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating the import configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// One entry per failed check.
    #[error("Invalid configuration: {}", .0.join("; "))]
    ValidationFailed(Vec<String>),

    #[error("Could not determine home directory")]
    HomeDirUnavailable,
}
