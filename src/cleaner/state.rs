use std::fmt;

/// Lifecycle states of a [`StorageCleaner`](crate::StorageCleaner)
///
/// A listener failure while `Running` does not change the state; it is
/// reported out-of-band and the host decides what to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CleanerState {
    Created,
    Starting,
    Running,
    Stopping,
    Stopped,
}

impl fmt::Display for CleanerState {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let name = match self {
            CleanerState::Created => "created",
            CleanerState::Starting => "starting",
            CleanerState::Running => "running",
            CleanerState::Stopping => "stopping",
            CleanerState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}
