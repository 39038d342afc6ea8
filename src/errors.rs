//! Storage Cleaner Error Hierarchy
//!
//! Errors are grouped by where they surface:
//! - [`LifecycleError`] is returned synchronously from `start`/`stop`
//! - [`StorageError`] comes out of a backend and ends up in an HTTP response
//! - [`ListenerError`] describes the background listener, either at bind time
//!   or when it dies after the service is running

use std::net::SocketAddr;
use std::time::Duration;

use config::ConfigError;
use tokio::task::JoinError;

use crate::CleanerState;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration loading failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Configuration validation failures
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Service lifecycle failures (start/stop and listener health)
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// Storage backend failures
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Unrecoverable failures requiring process termination
    #[error("Fatal error: {0}")]
    Fatal(String),
}

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    /// No backend registered under the configured name
    #[error("cannot find storage backend '{name}'")]
    BackendNotFound { name: String },

    /// Backend resolved but it does not expose the purge capability
    #[error("storage {name} does not implement Purger interface")]
    PurgeUnsupported { name: String },

    #[error("error starting cleaner server: {0}")]
    Listener(#[from] ListenerError),

    #[error("error shutting down cleaner server: {0}")]
    Shutdown(#[from] ShutdownError),

    /// Operation not permitted from the current lifecycle state
    #[error("cannot {operation} storage cleaner while {state}")]
    InvalidState {
        state: CleanerState,
        operation: &'static str,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// The serve loop returned without a close being requested
    #[error("listener exited unexpectedly")]
    Exited,

    #[error("listener task panicked: {0}")]
    Panicked(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ShutdownError {
    /// In-flight requests did not drain within the budget
    #[error("graceful shutdown did not complete within {0:?}")]
    DeadlineExceeded(Duration),

    #[error("listener task failed: {0}")]
    TaskFailed(#[from] JoinError),
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Embedded database errors
    #[error("Embedded database error: {0}")]
    DbError(#[from] sled::Error),

    /// A backend name was registered twice
    #[error("storage backend '{0}' already registered")]
    DuplicateBackend(String),

    /// Backend-specific purge failure
    #[error("{0}")]
    PurgeFailed(String),
}

