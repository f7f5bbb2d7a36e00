//! Snapshot Store Integration Tests
//!
//! Equipment registry over both backends, including persistence across a
//! reopen of the sled database.

use asset_health::{EquipmentRecord, EquipmentRegistry, InMemoryStore, SledStore, SnapshotStore};

fn sample_records() -> Vec<EquipmentRecord> {
    vec![
        EquipmentRecord::new("P-101", "Raw water pump").with_type("pump").with_ratings(4, 3),
        EquipmentRecord::new("M-101", "Raw water motor").with_type("motor"),
        EquipmentRecord::new("C-201", "Air compressor")
            .with_type("compressor")
            .with_location("East", "PS-2"),
    ]
}

fn exercise_registry<S: SnapshotStore>(registry: &EquipmentRegistry<S>) {
    for record in sample_records() {
        assert!(!registry.upsert(record).unwrap());
    }
    assert_eq!(registry.list().unwrap().len(), 3);

    let updated = EquipmentRecord::new("M-101", "Raw water motor (rewound)").with_type("motor");
    assert!(registry.upsert(updated).unwrap());
    let ids: Vec<String> = registry.list().unwrap().into_iter().map(|r| r.id).collect();
    assert_eq!(ids, vec!["P-101", "M-101", "C-201"]);

    assert!(registry.remove("P-101").unwrap());
    assert!(registry.get("P-101").unwrap().is_none());
    assert_eq!(registry.get("M-101").unwrap().unwrap().name, "Raw water motor (rewound)");
}

#[test]
fn registry_over_memory_store() {
    let registry = EquipmentRegistry::new(InMemoryStore::new());
    exercise_registry(&registry);
    assert_eq!(registry.store().keys().unwrap(), vec!["equipmentList".to_string()]);
}

#[test]
fn registry_over_sled_store_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snapshots.db");

    {
        let registry = EquipmentRegistry::new(SledStore::open(&path).unwrap());
        exercise_registry(&registry);
        registry.store().flush().unwrap();
    }

    let registry = EquipmentRegistry::new(SledStore::open(&path).unwrap());
    let list = registry.list().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[1].pump_station.as_deref(), Some("PS-2"));
}

#[test]
fn custom_key_isolates_lists() {
    let store = std::sync::Arc::new(InMemoryStore::new());
    let site_a = EquipmentRegistry::with_key(std::sync::Arc::clone(&store), "siteA");
    let site_b = EquipmentRegistry::with_key(std::sync::Arc::clone(&store), "siteB");

    site_a.upsert(EquipmentRecord::new("P-1", "Pump")).unwrap();
    assert!(site_b.list().unwrap().is_empty());
    assert!(site_a.clear().unwrap());
    assert!(site_a.list().unwrap().is_empty());
}

#[test]
fn store_holds_arbitrary_snapshots() {
    let store = InMemoryStore::new();
    store.save("lastAggregation", &serde_json::json!({"count": 3})).unwrap();
    let value: serde_json::Value = store.load("lastAggregation").unwrap().unwrap();
    assert_eq!(value["count"], 3);
    assert!(store.load::<serde_json::Value>("missing").unwrap().is_none());
}

#[test]
fn concurrent_sled_registries_keep_every_upsert() {
    let dir = tempfile::tempdir().unwrap();
    let store = SledStore::open(dir.path().join("shared.db")).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let registry = EquipmentRegistry::new(store.clone());
            std::thread::spawn(move || {
                for i in 0..20 {
                    registry.upsert(EquipmentRecord::new(format!("M-{t}-{i}"), "Motor")).unwrap();
                }
                assert!(registry.remove(&format!("M-{t}-0")).unwrap());
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let ids: Vec<String> = EquipmentRegistry::new(store).list().unwrap().into_iter().map(|r| r.id).collect();
    assert_eq!(ids.len(), 76);
    assert!(!ids.iter().any(|id| id.ends_with("-0")));
}
