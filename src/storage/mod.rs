//! Storage backends as seen by the cleaner.
//!
//! A backend is looked up by name through a [`BackendResolver`] and may or may
//! not expose the destructive [`Purger`] capability. The capability is
//! resolved once via [`StorageFactory::capability`] and never re-checked.

mod adaptors;
mod registry;


pub use adaptors::*;
pub use registry::*;

use std::fmt;
use std::sync::Arc;

#[cfg(test)]
use mockall::automock;

use crate::Result;

/// Irreversible deletion of all data held by a backend.
///
/// # Concurrency
/// Callers may invoke `purge` concurrently from several requests and are
/// not the only users of the backend. Implementations serialize internally
/// if they need to.
#[cfg_attr(test, automock)]
pub trait Purger: Send + Sync + 'static {
    fn purge(&self) -> Result<()>;
}

/// A named, independently configured storage instance.
pub trait StorageFactory: Send + Sync + 'static {
    /// Short backend type name used in logs and metrics
    fn kind(&self) -> &'static str;

    /// Optional behaviours this backend supports
    fn capability(self: Arc<Self>) -> BackendCapability {
        BackendCapability::Unsupported
    }
}

/// Capabilities a resolved backend may expose
#[derive(Clone)]
pub enum BackendCapability {
    /// Backend without destructive maintenance operations
    Unsupported,
    Purge(Arc<dyn Purger>),
}

impl BackendCapability {
    pub fn purger(self) -> Option<Arc<dyn Purger>> {
        match self {
            BackendCapability::Unsupported => None,
            BackendCapability::Purge(purger) => Some(purger),
        }
    }
}

impl fmt::Debug for BackendCapability {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            BackendCapability::Unsupported => f.write_str("Unsupported"),
            BackendCapability::Purge(_) => f.write_str("Purge"),
        }
    }
}

/// Host-side lookup of live backends by name.
///
/// Must answer synchronously; the cleaner calls it exactly once from `start`.
#[cfg_attr(test, automock)]
pub trait BackendResolver: Send + Sync {
    fn resolve(
        &self,
        name: &str,
    ) -> Option<Arc<dyn StorageFactory>>;
}
