use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Named storage backends the host registers before the cleaner starts
///
/// ```toml
/// [storage.backends.memstore]
/// kind = "memory"
///
/// [storage.backends.spans]
/// kind = "sled"
/// path = "/var/lib/cleaner/spans"
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    #[serde(default = "default_backends")]
    pub backends: HashMap<String, BackendConfig>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backends: default_backends(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackendConfig {
    /// Volatile in-process store
    Memory,
    /// Sled database at `path`
    Sled { path: PathBuf },
    /// Sled database exposed without the purge capability
    Archive { path: PathBuf },
}

impl StorageConfig {
    /// # Errors
    /// Returns `Error::InvalidConfig` for a blank backend name or a sled
    /// backed entry without a path
    pub fn validate(&self) -> Result<()> {
        for (name, backend) in &self.backends {
            if name.trim().is_empty() {
                return Err(Error::InvalidConfig("storage backend name cannot be empty".into()));
            }

            match backend {
                BackendConfig::Memory => {}
                BackendConfig::Sled { path } | BackendConfig::Archive { path } => {
                    if path.as_os_str().is_empty() {
                        return Err(Error::InvalidConfig(format!(
                            "storage backend '{name}' requires a path"
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

fn default_backends() -> HashMap<String, BackendConfig> {
    HashMap::from([("memstore".to_string(), BackendConfig::Memory)])
}
