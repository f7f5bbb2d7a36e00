//! Snapshot storage: a key-value store of JSON documents
//!
//! Abstracts where snapshots live so the equipment registry (and anything
//! else a host wants to persist) can swap backends:
//! - `InMemoryStore`: tests and throwaway sessions
//! - `SledStore`: embedded on-disk store
//!
//! Keys are plain strings; values are JSON-serialized. The aggregator and the
//! validators never touch a store.

mod memory;
mod registry;
mod sled_store;

pub use memory::InMemoryStore;
pub use registry::{EquipmentRecord, EquipmentRegistry};
pub use sled_store::SledStore;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("serialization error for key '{key}': {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("database error: {0}")]
    Database(#[from] sled::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage lock poisoned")]
    Poisoned,
    #[error("key '{0}' is not valid UTF-8")]
    InvalidKey(String),
    #[error("update of key '{0}' never ran")]
    UpdateSkipped(String),
}

/// Trait for pluggable snapshot backends
///
/// Implementations must be thread-safe (Send + Sync) so one store can be
/// shared by several registries. Backends only move bytes; `save` and `load`
/// handle the JSON encoding.
pub trait SnapshotStore: Send + Sync {
    /// Store raw bytes under `key`, replacing any previous value
    fn put_raw(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError>;

    /// Raw bytes stored under `key`
    fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Delete `key`; true if it existed
    fn remove(&self, key: &str) -> Result<bool, StoreError>;

    /// Atomic read-modify-write of `key`.
    ///
    /// `f` sees the current bytes and returns the replacement, or `None` to
    /// leave the value as it is. No other write to `key` lands between the
    /// read and the write. Backends may call `f` more than once when a
    /// concurrent write wins the race, so `f` must not keep state across
    /// calls beyond overwriting its own outputs.
    fn update_raw(
        &self,
        key: &str,
        f: &mut dyn FnMut(Option<&[u8]>) -> Option<Vec<u8>>,
    ) -> Result<(), StoreError>;

    /// All keys in ascending order
    fn keys(&self) -> Result<Vec<String>, StoreError>;

    /// Backend name for logging
    fn backend_name(&self) -> &'static str;

    /// Serialize `value` as JSON and store it under `key`
    fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError>
    where
        Self: Sized,
    {
        let bytes = serde_json::to_vec(value).map_err(|source| StoreError::Serialization {
            key: key.to_string(),
            source,
        })?;
        self.put_raw(key, bytes)
    }

    /// Load and decode the JSON value under `key`
    fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError>
    where
        Self: Sized,
    {
        self.get_raw(key)?
            .map(|bytes| {
                serde_json::from_slice(&bytes).map_err(|source| StoreError::Serialization {
                    key: key.to_string(),
                    source,
                })
            })
            .transpose()
    }
}

macro_rules! forward_snapshot_store {
    ($wrapper:ident) => {
        impl<S: SnapshotStore + ?Sized> SnapshotStore for $wrapper<S> {
            fn put_raw(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
                (**self).put_raw(key, value)
            }

            fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
                (**self).get_raw(key)
            }

            fn remove(&self, key: &str) -> Result<bool, StoreError> {
                (**self).remove(key)
            }

            fn update_raw(
                &self,
                key: &str,
                f: &mut dyn FnMut(Option<&[u8]>) -> Option<Vec<u8>>,
            ) -> Result<(), StoreError> {
                (**self).update_raw(key, f)
            }

            fn keys(&self) -> Result<Vec<String>, StoreError> {
                (**self).keys()
            }

            fn backend_name(&self) -> &'static str {
                (**self).backend_name()
            }
        }
    };
}

forward_snapshot_store!(Box);
forward_snapshot_store!(Arc);
