pub mod config;
pub mod error;
pub mod security;
pub mod validator;

pub use config::ImportConfig;
pub use error::ConfigError;
