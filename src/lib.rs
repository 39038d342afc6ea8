//! Lifecycle-managed admin service that purges a named storage backend over HTTP.
//!
//! The host registers backends in a [`StorageRegistry`], hands it to
//! [`StorageCleaner::start`], and listens for fatal listener events on the
//! receiver returned by [`status_channel`].

mod cleaner;
mod component;
mod config;
mod errors;
mod status;
mod storage;

pub mod constants;
pub mod metrics;

pub use cleaner::*;
pub use component::*;
pub use self::config::*;
pub use errors::*;
pub use status::*;
pub use storage::*;

#[cfg(test)]
pub(crate) mod test_utils;
