use std::path::Path;
use std::sync::Arc;

use tracing::debug;
use tracing::info;
use tracing::instrument;
use tracing::warn;

use crate::BackendCapability;
use crate::Purger;
use crate::Result;
use crate::StorageError;
use crate::StorageFactory;

/// Sled-backed key/value backend
///
/// Data lives in the default tree and any number of named trees; a purge
/// empties all of them.
#[derive(Debug, Clone)]
pub struct SledStorage {
    db: sled::Db,
}

impl SledStorage {
    pub fn open(path: impl AsRef<Path> + std::fmt::Debug) -> Result<Self> {
        debug!("open sled storage from path: {:?}", &path);

        let db = sled::Config::default()
            .path(path.as_ref())
            .cache_capacity(10 * 1024 * 1024) //10MB
            .flush_every_ms(Some(10))
            .use_compression(true)
            .compression_factor(1)
            .open()
            .map_err(|e| {
                warn!(
                    "Try to open DB at this location: {:?} and failed: {:?}",
                    path, e
                );
                StorageError::DbError(e)
            })?;

        Ok(Self { db })
    }

    pub fn insert(
        &self,
        key: impl AsRef<[u8]>,
        value: impl AsRef<[u8]>,
    ) -> Result<()> {
        self.db.insert(key.as_ref(), value.as_ref()).map_err(StorageError::from)?;
        Ok(())
    }

    pub fn get(
        &self,
        key: impl AsRef<[u8]>,
    ) -> Result<Option<Vec<u8>>> {
        let value = self.db.get(key).map_err(StorageError::from)?;
        Ok(value.map(|v| v.to_vec()))
    }

    /// Opens (or creates) a named tree inside the same database
    pub fn tree(
        &self,
        name: &str,
    ) -> Result<sled::Tree> {
        Ok(self.db.open_tree(name).map_err(StorageError::from)?)
    }

    /// Number of entries across the default tree and every named tree
    pub fn len(&self) -> Result<usize> {
        let mut total = 0;
        for name in self.db.tree_names() {
            total += self.db.open_tree(name).map_err(StorageError::from)?.len();
        }
        Ok(total)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl Purger for SledStorage {
    #[instrument(skip(self))]
    fn purge(&self) -> Result<()> {
        let default_tree = self.db.name();

        for name in self.db.tree_names() {
            if name == default_tree {
                // The default tree cannot be dropped, only emptied
                self.db.clear().map_err(StorageError::from)?;
            } else {
                self.db.drop_tree(&name).map_err(StorageError::from)?;
            }
        }

        let flushed = self.db.flush().map_err(StorageError::from)?;
        info!("sled storage purged, {} bytes flushed", flushed);
        Ok(())
    }
}

impl StorageFactory for SledStorage {
    fn kind(&self) -> &'static str {
        "sled"
    }

    fn capability(self: Arc<Self>) -> BackendCapability {
        BackendCapability::Purge(self)
    }
}
