use std::time::Duration;

// -
// Cleaner listener

/// Default port of the purge listener
pub const DEFAULT_CLEANER_PORT: u16 = 9231;

/// The only route served by the purge listener
pub const PURGE_PATH: &str = "purge";

/// Time a client gets to send complete request headers
pub const PURGE_HEADER_READ_TIMEOUT: Duration = Duration::from_secs(3);

/// Pause before accepting again after a non-connection accept failure
pub const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// Body returned when a purge completes
pub const PURGE_SUCCESS_BODY: &str = "Purge request processed successfully";

// -
// Component identifiers

/// Registry component that must be initialised before the cleaner starts
pub const STORAGE_REGISTRY_ID: &str = "storage_registry";

/// Identifier the cleaner reports status under
pub const STORAGE_CLEANER_ID: &str = "storage_cleaner";

// -
// Status channel

pub(crate) const STATUS_CHANNEL_CAPACITY: usize = 16;
