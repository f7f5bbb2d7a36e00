//! In-memory snapshot store

use std::collections::BTreeMap;
use std::sync::RwLock;

use super::{SnapshotStore, StoreError};

/// In-memory store for tests and minimal deployments
///
/// Thread-safe via `RwLock`. Not durable: data is lost when dropped.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SnapshotStore for InMemoryStore {
    fn put_raw(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_string(), value);
        Ok(())
    }

    fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn remove(&self, key: &str) -> Result<bool, StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.remove(key).is_some())
    }

    fn update_raw(
        &self,
        key: &str,
        f: &mut dyn FnMut(Option<&[u8]>) -> Option<Vec<u8>>,
    ) -> Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        if let Some(next) = f(entries.get(key).map(Vec::as_slice)) {
            entries.insert(key.to_string(), next);
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.keys().cloned().collect())
    }

    fn backend_name(&self) -> &'static str {
        "InMemory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_load_remove() {
        let store = InMemoryStore::new();
        assert!(store.is_empty());

        store.save("a", &42u32).unwrap();
        assert_eq!(store.load::<u32>("a").unwrap(), Some(42));
        assert_eq!(store.len(), 1);

        assert!(store.remove("a").unwrap());
        assert!(!store.remove("a").unwrap());
        assert_eq!(store.load::<u32>("a").unwrap(), None);
    }

    #[test]
    fn test_save_overwrites() {
        let store = InMemoryStore::new();
        store.save("a", &1u32).unwrap();
        store.save("a", &2u32).unwrap();
        assert_eq!(store.load::<u32>("a").unwrap(), Some(2));
    }

    #[test]
    fn test_keys_sorted() {
        let store = InMemoryStore::new();
        store.save("zeta", &0).unwrap();
        store.save("alpha", &0).unwrap();
        assert_eq!(store.keys().unwrap(), vec!["alpha".to_string(), "zeta".to_string()]);
    }

    #[test]
    fn test_update_raw_sees_current_value() {
        let store = InMemoryStore::new();
        let mut bump = |cur: Option<&[u8]>| {
            let n = cur.map_or(0, |b| b[0]);
            Some(vec![n + 1])
        };
        store.update_raw("n", &mut bump).unwrap();
        store.update_raw("n", &mut bump).unwrap();
        assert_eq!(store.get_raw("n").unwrap(), Some(vec![2]));

        store.update_raw("n", &mut |_: Option<&[u8]>| None::<Vec<u8>>).unwrap();
        assert_eq!(store.get_raw("n").unwrap(), Some(vec![2]));
    }
}
