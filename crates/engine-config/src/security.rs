use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Paths to the TLS material used to talk to the cluster.
///
/// Either all three paths are set, or none of them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecurityConfig {
    #[serde(default)]
    pub ca_path: Option<PathBuf>,

    #[serde(default)]
    pub cert_path: Option<PathBuf>,

    #[serde(default)]
    pub key_path: Option<PathBuf>,
}

fn non_empty(path: &Option<PathBuf>) -> Option<&Path> {
    path.as_deref().filter(|p| !p.as_os_str().is_empty())
}

impl SecurityConfig {
    pub fn is_enabled(&self) -> bool {
        self.paths().iter().any(|(_, p)| p.is_some())
    }

    fn paths(&self) -> [(&'static str, Option<&Path>); 3] {
        [
            ("ca_path", non_empty(&self.ca_path)),
            ("cert_path", non_empty(&self.cert_path)),
            ("key_path", non_empty(&self.key_path)),
        ]
    }

    pub(crate) fn check(&self, errors: &mut Vec<String>) {
        if !self.is_enabled() {
            return;
        }

        for (name, path) in self.paths() {
            match path {
                None => errors.push(format!(
                    "security.{name} must be set when any TLS path is configured"
                )),
                Some(p) if !p.exists() => {
                    errors.push(format!("security.{name} '{}' does not exist", p.display()))
                }
                Some(_) => {}
            }
        }
    }
}

/// PEM-encoded TLS material read from disk.
#[derive(Clone)]
pub struct TlsMaterial {
    pub ca: Vec<u8>,
    pub cert: Vec<u8>,
    pub key: Vec<u8>,
}

impl std::fmt::Debug for TlsMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsMaterial")
            .field("ca", &self.ca.len())
            .field("cert", &self.cert.len())
            .field("key", &"<redacted>")
            .finish()
    }
}

impl TlsMaterial {
    /// Loads the configured material, or `None` when TLS is disabled.
    pub async fn load(config: &SecurityConfig) -> Result<Option<Self>, ConfigError> {
        let (Some(ca), Some(cert), Some(key)) = (
            non_empty(&config.ca_path),
            non_empty(&config.cert_path),
            non_empty(&config.key_path),
        ) else {
            return Ok(None);
        };

        let material = TlsMaterial {
            ca: read(ca).await?,
            cert: read(cert).await?,
            key: read(key).await?,
        };
        info!(ca = %ca.display(), cert = %cert.display(), "Loaded TLS material");
        Ok(Some(material))
    }
}

async fn read(path: &Path) -> Result<Vec<u8>, ConfigError> {
    tokio::fs::read(path).await.map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })
}
