use engine_config::ConfigError;
use engine_core::error::DirectoryError;
use engine_runtime::error::RunError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to load the configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid record on line {line}: {source}")]
    InvalidRecord {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to run the import: {0}")]
    Runner(#[from] RunError),

    #[error("Store directory error: {0}")]
    Directory(#[from] DirectoryError),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),
}
