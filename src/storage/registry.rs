use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;
use tracing::info;

use crate::constants::STORAGE_REGISTRY_ID;
use crate::BackendConfig;
use crate::BackendResolver;
use crate::ComponentId;
use crate::MemoryStorage;
use crate::ReadOnlyStorage;
use crate::Result;
use crate::SledStorage;
use crate::StorageConfig;
use crate::StorageError;
use crate::StorageFactory;

/// Name → backend map the host fills before any dependent component starts
#[derive(Default)]
pub struct StorageRegistry {
    backends: DashMap<String, Arc<dyn StorageFactory>>,
}

impl StorageRegistry {
    pub const ID: ComponentId = ComponentId::new(STORAGE_REGISTRY_ID);

    pub fn new() -> Self {
        Self::default()
    }

    /// Builds every backend declared in config
    ///
    /// # Errors
    /// Fails on the first backend that cannot be opened
    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        let registry = Self::new();

        for (name, backend) in &config.backends {
            let factory: Arc<dyn StorageFactory> = match backend {
                BackendConfig::Memory => Arc::new(MemoryStorage::new()),
                BackendConfig::Sled { path } => Arc::new(SledStorage::open(path)?),
                BackendConfig::Archive { path } => {
                    Arc::new(ReadOnlyStorage::new(Arc::new(SledStorage::open(path)?)))
                }
            };
            registry.register(name.clone(), factory)?;
        }

        info!("storage registry initialised with {} backends", registry.len());
        Ok(registry)
    }

    /// Registers a backend under `name`
    ///
    /// # Errors
    /// `StorageError::DuplicateBackend` if the name is already taken, so a
    /// name always resolves to exactly one backend
    pub fn register(
        &self,
        name: impl Into<String>,
        backend: Arc<dyn StorageFactory>,
    ) -> Result<()> {
        let name = name.into();
        match self.backends.entry(name) {
            Entry::Occupied(entry) => Err(StorageError::DuplicateBackend(entry.key().clone()).into()),
            Entry::Vacant(entry) => {
                debug!("register {} backend '{}'", backend.kind(), entry.key());
                entry.insert(backend);
                Ok(())
            }
        }
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.backends.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

impl BackendResolver for StorageRegistry {
    fn resolve(
        &self,
        name: &str,
    ) -> Option<Arc<dyn StorageFactory>> {
        self.backends.get(name).map(|entry| entry.value().clone())
    }
}
