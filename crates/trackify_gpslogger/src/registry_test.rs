#[cfg(test)]
mod tests {
    use crate::logic::TrackerAttributes;
    use crate::registry::TrackerRegistry;
    use crate::store::{MemoryStore, SnapshotStore, TrackerSnapshot};
    use crate::tracker::TrackerUpdate;
    use chrono::{DateTime, TimeZone, Utc};
    use std::sync::Arc;

    fn ts(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, hour, 0, 0).unwrap()
    }

    fn update(device: &str, lat: f64, last_seen: Option<DateTime<Utc>>) -> TrackerUpdate {
        TrackerUpdate {
            device: device.to_string(),
            location: (lat, 20.0),
            battery: 50.0,
            accuracy: 25.0,
            attributes: TrackerAttributes {
                last_seen,
                ..TrackerAttributes::default()
            },
        }
    }

    #[test]
    fn test_dispatch_creates_sink_on_first_sight() {
        let store = Arc::new(MemoryStore::new());
        let registry = TrackerRegistry::new(store);

        registry.dispatch(&update("abc", 10.0, None)).unwrap();
        assert_eq!(registry.devices().unwrap(), vec!["abc".to_string()]);

        // second report for the same id reuses the sink
        registry.dispatch(&update("abc", 11.0, None)).unwrap();
        assert_eq!(registry.devices().unwrap(), vec!["abc".to_string()]);
        let lat = registry
            .with_entity("abc", |entity| entity.latitude())
            .unwrap()
            .unwrap();
        assert_eq!(lat, Some(11.0));
    }

    #[test]
    fn test_broadcast_only_mutates_matching_sink() {
        let store = Arc::new(MemoryStore::new());
        let registry = TrackerRegistry::new(store);
        registry.dispatch(&update("x", 1.0, None)).unwrap();
        registry.dispatch(&update("y", 2.0, None)).unwrap();

        registry.dispatch(&update("x", 3.0, None)).unwrap();

        let x_lat = registry
            .with_entity("x", |entity| entity.latitude())
            .unwrap()
            .unwrap();
        let y_lat = registry
            .with_entity("y", |entity| entity.latitude())
            .unwrap()
            .unwrap();
        assert_eq!(x_lat, Some(3.0));
        assert_eq!(y_lat, Some(2.0));
    }

    #[test]
    fn test_new_sink_keeps_watermark_from_initial_reading() {
        let store = Arc::new(MemoryStore::new());
        let registry = TrackerRegistry::new(store);
        registry.dispatch(&update("abc", 10.0, Some(ts(12)))).unwrap();

        // the dispatch that created the sink was not applied twice and the
        // watermark guards against older redeliveries
        registry.dispatch(&update("abc", 99.0, Some(ts(11)))).unwrap();
        let lat = registry
            .with_entity("abc", |entity| entity.latitude())
            .unwrap()
            .unwrap();
        assert_eq!(lat, Some(10.0));
    }

    #[test]
    fn test_dispatch_persists_snapshot() {
        let store = Arc::new(MemoryStore::new());
        let registry = TrackerRegistry::new(store.clone());
        registry.dispatch(&update("abc", 10.0, Some(ts(12)))).unwrap();

        let snapshot = store.load("abc").unwrap().unwrap();
        assert_eq!(snapshot.latitude, Some(10.0));
        assert_eq!(snapshot.gps_accuracy, Some(25.0));
        assert_eq!(snapshot.last_seen, Some(ts(12).to_rfc3339()));
    }

    #[test]
    fn test_stale_update_does_not_overwrite_snapshot() {
        let store = Arc::new(MemoryStore::new());
        let registry = TrackerRegistry::new(store.clone());
        registry.dispatch(&update("abc", 10.0, Some(ts(12)))).unwrap();
        registry.dispatch(&update("abc", 99.0, Some(ts(11)))).unwrap();

        let snapshot = store.load("abc").unwrap().unwrap();
        assert_eq!(snapshot.latitude, Some(10.0));
    }

    #[test]
    fn test_restore_known_devices() {
        let store = Arc::new(MemoryStore::new());
        store
            .save(
                "abc",
                &TrackerSnapshot {
                    latitude: Some(1.0),
                    longitude: Some(2.0),
                    gps_accuracy: Some(5.0),
                    battery_level: Some(80.0),
                    last_seen: Some("2024-01-01T00:00:00+00:00".to_string()),
                    ..TrackerSnapshot::default()
                },
            )
            .unwrap();

        let registry = TrackerRegistry::new(store);
        assert_eq!(registry.restore_known_devices().unwrap(), 1);
        // idempotent: already-registered devices are not restored again
        assert_eq!(registry.restore_known_devices().unwrap(), 0);

        let (lat, battery) = registry
            .with_entity("abc", |entity| (entity.latitude(), entity.battery_level()))
            .unwrap()
            .unwrap();
        assert_eq!(lat, Some(1.0));
        assert_eq!(battery, Some(80));
    }
}
