use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;
use tracing::trace;

use crate::BackendCapability;
use crate::Purger;
use crate::Result;
use crate::StorageFactory;

/// Volatile in-process key/value backend
#[derive(Debug, Default)]
pub struct MemoryStorage {
    data: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &self,
        key: impl Into<Vec<u8>>,
        value: impl Into<Vec<u8>>,
    ) {
        let key = key.into();
        trace!("insert key len = {}", key.len());
        self.data.write().insert(key, value.into());
    }

    pub fn get(
        &self,
        key: &[u8],
    ) -> Option<Vec<u8>> {
        self.data.read().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Purger for MemoryStorage {
    fn purge(&self) -> Result<()> {
        let mut data = self.data.write();
        let removed = data.len();
        data.clear();

        info!("memory storage purged, {} entries removed", removed);
        Ok(())
    }
}

impl StorageFactory for MemoryStorage {
    fn kind(&self) -> &'static str {
        "memory"
    }

    fn capability(self: Arc<Self>) -> BackendCapability {
        BackendCapability::Purge(self)
    }
}
