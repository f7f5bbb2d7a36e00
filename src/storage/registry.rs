//! Equipment registry over a snapshot store
//!
//! The equipment list is one JSON array stored under a single key (the
//! `storage.equipment_key` config value). Edits go through the store's atomic
//! `update_raw`, so registries sharing a store never lose each other's
//! upserts or removals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{SnapshotStore, StoreError};
use crate::config::defaults::EQUIPMENT_LIST_KEY;

/// One registered piece of equipment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentRecord {
    pub id: String,
    pub name: String,
    /// "pump", "motor", "compressor", ...
    #[serde(default, rename = "type")]
    pub equipment_type: Option<String>,
    #[serde(default)]
    pub zone: Option<String>,
    #[serde(default)]
    pub pump_station: Option<String>,
    #[serde(default, deserialize_with = "crate::types::deserialize_rating")]
    pub criticality: Option<u8>,
    #[serde(default, deserialize_with = "crate::types::deserialize_rating")]
    pub environment: Option<u8>,
    #[serde(default, deserialize_with = "crate::types::timestamp::deserialize_option")]
    pub installed: Option<DateTime<Utc>>,
}

impl EquipmentRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            equipment_type: None,
            zone: None,
            pump_station: None,
            criticality: None,
            environment: None,
            installed: None,
        }
    }

    pub fn with_type(mut self, equipment_type: impl Into<String>) -> Self {
        self.equipment_type = Some(equipment_type.into());
        self
    }

    pub fn with_location(mut self, zone: impl Into<String>, pump_station: impl Into<String>) -> Self {
        self.zone = Some(zone.into());
        self.pump_station = Some(pump_station.into());
        self
    }

    pub fn with_ratings(mut self, criticality: u8, environment: u8) -> Self {
        self.criticality = Some(criticality);
        self.environment = Some(environment);
        self
    }
}

/// Equipment list persisted in an injected store
pub struct EquipmentRegistry<S: SnapshotStore> {
    store: S,
    key: String,
}

impl<S: SnapshotStore> EquipmentRegistry<S> {
    /// Registry under the default `equipmentList` key
    pub fn new(store: S) -> Self {
        Self::with_key(store, EQUIPMENT_LIST_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self { store, key: key.into() }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// All records in insertion order; an unset key is an empty list
    pub fn list(&self) -> Result<Vec<EquipmentRecord>, StoreError> {
        Ok(self.store.load(&self.key)?.unwrap_or_default())
    }

    pub fn get(&self, id: &str) -> Result<Option<EquipmentRecord>, StoreError> {
        Ok(self.list()?.into_iter().find(|r| r.id == id))
    }

    /// Insert or replace by id. Returns true when an existing record was
    /// replaced; replaced records keep their position.
    pub fn upsert(&self, record: EquipmentRecord) -> Result<bool, StoreError> {
        let (replaced, count) = self.modify(|records| {
            let replaced = match records.iter_mut().find(|r| r.id == record.id) {
                Some(existing) => {
                    *existing = record.clone();
                    true
                }
                None => {
                    records.push(record.clone());
                    false
                }
            };
            (true, (replaced, records.len()))
        })?;
        debug!(key = %self.key, count, replaced, "Saved equipment list");
        Ok(replaced)
    }

    /// Remove by id; true if a record was removed
    pub fn remove(&self, id: &str) -> Result<bool, StoreError> {
        let removed = self.modify(|records| {
            let before = records.len();
            records.retain(|r| r.id != id);
            let removed = records.len() != before;
            (removed, removed)
        })?;
        if removed {
            info!(key = %self.key, id, "Removed equipment");
        }
        Ok(removed)
    }

    /// Decode, edit and re-encode the list as one atomic store update.
    ///
    /// `edit` returns whether it changed the list (unchanged lists are not
    /// rewritten) and its result. It may run more than once.
    fn modify<R>(
        &self,
        mut edit: impl FnMut(&mut Vec<EquipmentRecord>) -> (bool, R),
    ) -> Result<R, StoreError> {
        let mut outcome: Option<Result<R, StoreError>> = None;
        self.store.update_raw(&self.key, &mut |current: Option<&[u8]>| {
            let decoded: Result<Vec<EquipmentRecord>, serde_json::Error> = match current {
                Some(bytes) => serde_json::from_slice(bytes),
                None => Ok(Vec::new()),
            };
            let mut records = match decoded {
                Ok(records) => records,
                Err(source) => {
                    outcome = Some(Err(self.serialization_error(source)));
                    return None;
                }
            };
            let (changed, result) = edit(&mut records);
            if !changed {
                outcome = Some(Ok(result));
                return None;
            }
            match serde_json::to_vec(&records) {
                Ok(bytes) => {
                    outcome = Some(Ok(result));
                    Some(bytes)
                }
                Err(source) => {
                    outcome = Some(Err(self.serialization_error(source)));
                    None
                }
            }
        })?;
        outcome.unwrap_or_else(|| Err(StoreError::UpdateSkipped(self.key.clone())))
    }

    fn serialization_error(&self, source: serde_json::Error) -> StoreError {
        StoreError::Serialization { key: self.key.clone(), source }
    }

    /// Drop the whole list
    pub fn clear(&self) -> Result<bool, StoreError> {
        self.store.remove(&self.key)
    }
}
