//! Sled-backed snapshot store

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use super::{SnapshotStore, StoreError};

/// Embedded on-disk store
///
/// Writes are not flushed individually; sled flushes in the background and
/// `flush` forces it. The CLI flushes before exiting.
#[derive(Clone)]
pub struct SledStore {
    db: Arc<sled::Db>,
}

impl SledStore {
    /// Open or create the store at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let db = sled::open(path)?;
        info!(path = %path.display(), entries = db.len(), "Opened snapshot store");
        Ok(Self { db: Arc::new(db) })
    }

    /// Number of stored snapshots
    pub fn count(&self) -> usize {
        self.db.len()
    }

    /// Force pending writes to disk
    pub fn flush(&self) -> Result<(), StoreError> {
        self.db.flush()?;
        Ok(())
    }
}

impl SnapshotStore for SledStore {
    fn put_raw(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        self.db.insert(key.as_bytes(), value)?;
        Ok(())
    }

    fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.db.get(key.as_bytes())?.map(|v| v.to_vec()))
    }

    fn remove(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.db.remove(key.as_bytes())?.is_some())
    }

    fn update_raw(
        &self,
        key: &str,
        f: &mut dyn FnMut(Option<&[u8]>) -> Option<Vec<u8>>,
    ) -> Result<(), StoreError> {
        // sled retries the closure on a lost compare-and-swap
        self.db.fetch_and_update(key.as_bytes(), |current| match f(current) {
            Some(next) => Some(next),
            None => current.map(<[u8]>::to_vec),
        })?;
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        self.db
            .iter()
            .keys()
            .map(|key| {
                let key = key?;
                String::from_utf8(key.to_vec())
                    .map_err(|e| StoreError::InvalidKey(String::from_utf8_lossy(e.as_bytes()).into_owned()))
            })
            .collect()
    }

    fn backend_name(&self) -> &'static str {
        "Sled"
    }
}
