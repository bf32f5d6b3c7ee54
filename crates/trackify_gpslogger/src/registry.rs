// --- File: crates/trackify_gpslogger/src/registry.rs ---

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

use trackify_common::{storage_error, TrackifyError};

use crate::store::SnapshotStore;
use crate::tracker::{TrackerEntity, TrackerUpdate};

#[derive(Default)]
struct RegistryInner {
    // fan-out happens in registration order
    order: Vec<String>,
    entities: HashMap<String, TrackerEntity>,
}

/// Keyed registry of tracker entities plus the broadcast fan-out.
///
/// One instance owns every sink in the process. [`TrackerRegistry::dispatch`]
/// is the single publisher: it delivers each accepted reading to all
/// registered sinks synchronously and plays the "new device" listener,
/// creating a sink the first time an unseen device id appears. The lock is
/// held across the whole fan-out, so updates never interleave.
pub struct TrackerRegistry {
    store: Arc<dyn SnapshotStore>,
    inner: Mutex<RegistryInner>,
}

impl TrackerRegistry {
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        TrackerRegistry {
            store,
            inner: Mutex::new(RegistryInner::default()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, RegistryInner>, TrackifyError> {
        self.inner
            .lock()
            .map_err(|_| storage_error("tracker registry mutex poisoned"))
    }

    /// Re-attach entities for every device the store already knows, adopting
    /// their persisted snapshots. Returns how many were restored. Idempotent:
    /// devices already registered are left alone.
    pub fn restore_known_devices(&self) -> Result<usize, TrackifyError> {
        let mut inner = self.lock()?;
        let mut restored = 0;
        for device_id in self.store.device_ids()? {
            if inner.entities.contains_key(&device_id) {
                continue;
            }
            let snapshot = self.store.load(&device_id)?;
            let mut entity = TrackerEntity::from_device_id(&device_id);
            entity.restore(snapshot.as_ref());
            inner.order.push(device_id.clone());
            inner.entities.insert(device_id, entity);
            restored += 1;
        }
        Ok(restored)
    }

    /// Broadcast one accepted reading to every registered sink.
    ///
    /// Each sink self-filters by device id; a freshly created sink does not
    /// also receive the update that created it. After an applied change, the
    /// affected entity's snapshot is persisted.
    pub fn dispatch(&self, update: &TrackerUpdate) -> Result<(), TrackifyError> {
        let mut inner = self.lock()?;

        let known = inner.entities.contains_key(&update.device);
        let mut changed = false;
        let order = inner.order.clone();
        for device_id in &order {
            if let Some(entity) = inner.entities.get_mut(device_id) {
                changed |= entity.apply_update(update);
            }
        }

        if !known {
            info!("tracking new device {}", update.device);
            let entity = TrackerEntity::with_reading(update);
            inner.order.push(update.device.clone());
            inner.entities.insert(update.device.clone(), entity);
            changed = true;
        }

        if changed {
            if let Some(entity) = inner.entities.get(&update.device) {
                self.store.save(&update.device, &entity.snapshot())?;
            }
        }
        Ok(())
    }

    /// Device ids in registration order.
    pub fn devices(&self) -> Result<Vec<String>, TrackifyError> {
        Ok(self.lock()?.order.clone())
    }

    /// Run a closure against one entity's current state, if registered.
    pub fn with_entity<T>(
        &self,
        device_id: &str,
        read: impl FnOnce(&TrackerEntity) -> T,
    ) -> Result<Option<T>, TrackifyError> {
        Ok(self.lock()?.entities.get(device_id).map(read))
    }
}
