//! The storage cleaner: a lifecycle-managed service exposing `POST /purge`.
//!
//! ## Lifecycle
//! `Created → Starting → Running → Stopping → Stopped`
//!
//! - `start()` resolves the configured backend, checks it can purge, binds the
//!   listener and returns while the listener keeps running on its own task.
//! - A listener that dies while `Running` is reported to the host through the
//!   [`StatusReporter`](crate::StatusReporter); it is never restarted.
//! - `stop()` stops accepting connections and drains in-flight requests
//!   within the caller's deadline.
//!
//! ## Example
//! ```ignore
//! let (reporter, status_rx) = status_channel();
//! let mut cleaner = StorageCleaner::new(config.cleaner, Arc::new(reporter));
//! cleaner.start(&registry)?;
//! // ...
//! cleaner.stop(Duration::from_secs(5)).await?;
//! ```

mod cleaner;
mod handler;
mod listener;
mod state;

pub use cleaner::*;
pub(crate) use handler::*;
pub(crate) use listener::*;
pub use state::*;
