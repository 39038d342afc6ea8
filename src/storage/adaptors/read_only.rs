use std::sync::Arc;

use crate::StorageFactory;

/// Exposes a backend without any destructive capability.
///
/// Used for archive stores that share an engine with purgeable ones but
/// must never be wiped through the cleaner.
#[derive(Debug)]
pub struct ReadOnlyStorage<S> {
    inner: Arc<S>,
}

impl<S> ReadOnlyStorage<S>
where
    S: StorageFactory,
{
    pub fn new(inner: Arc<S>) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &Arc<S> {
        &self.inner
    }
}

impl<S> StorageFactory for ReadOnlyStorage<S>
where
    S: StorageFactory,
{
    fn kind(&self) -> &'static str {
        "archive"
    }
}
