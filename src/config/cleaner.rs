use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::constants::DEFAULT_CLEANER_PORT;
use crate::Error;
use crate::Result;

/// Purge listener configuration
///
/// Supplied once at construction and never mutated afterwards. Field-level
/// defaults use helper functions prefixed with `default_`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CleanerConfig {
    /// Name of the storage backend to purge
    ///
    /// Must resolve to exactly one registered backend when the cleaner starts.
    #[serde(default = "default_trace_storage")]
    pub trace_storage: String,

    /// Listen port of the purge endpoint
    ///
    /// Default: `9231`. `0` binds an ephemeral port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Budget the host gives `stop` to drain in-flight requests
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_in_ms: u64,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            trace_storage: default_trace_storage(),
            port: default_port(),
            shutdown_timeout_in_ms: default_shutdown_timeout(),
        }
    }
}

impl CleanerConfig {
    pub fn new(
        trace_storage: impl Into<String>,
        port: u16,
    ) -> Self {
        Self {
            trace_storage: trace_storage.into(),
            port,
            ..Default::default()
        }
    }

    /// Address the purge listener binds, `0.0.0.0:<port>`
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_in_ms)
    }

    /// Validates cleaner configuration
    /// # Errors
    /// Returns `Error::InvalidConfig` when the backend name is blank or the
    /// shutdown budget is zero
    pub fn validate(&self) -> Result<()> {
        if self.trace_storage.trim().is_empty() {
            return Err(Error::InvalidConfig("trace_storage cannot be empty".into()));
        }

        if self.shutdown_timeout_in_ms == 0 {
            return Err(Error::InvalidConfig("shutdown_timeout_in_ms must be greater than 0".into()));
        }

        Ok(())
    }
}

fn default_trace_storage() -> String {
    "memstore".to_string()
}

fn default_port() -> u16 {
    DEFAULT_CLEANER_PORT
}

fn default_shutdown_timeout() -> u64 {
    5_000
}
