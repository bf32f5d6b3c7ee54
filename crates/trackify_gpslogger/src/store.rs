// --- File: crates/trackify_gpslogger/src/store.rs ---

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use trackify_common::{storage_error, TrackifyError};

/// The per-device state persisted by the external observer.
///
/// Field names follow the attribute names exposed to the observer;
/// `last_seen` is persisted as an RFC 3339 string and re-parsed on restore.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackerSnapshot {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub gps_accuracy: Option<f64>,
    pub battery_level: Option<f64>,
    pub activity: Option<String>,
    pub altitude: Option<f64>,
    pub battery_charging: Option<bool>,
    pub direction: Option<f64>,
    pub last_seen: Option<String>,
    pub provider: Option<String>,
    pub speed: Option<f64>,
}

/// Snapshot load/save interface injected into the tracker registry.
///
/// Tracker entities perform no I/O themselves; the registry persists through
/// this trait after each applied update and restores from it at attach time.
pub trait SnapshotStore: Send + Sync {
    fn load(&self, device_id: &str) -> Result<Option<TrackerSnapshot>, TrackifyError>;
    fn save(&self, device_id: &str, snapshot: &TrackerSnapshot) -> Result<(), TrackifyError>;
    /// Device ids with a persisted snapshot, in stable order.
    fn device_ids(&self) -> Result<Vec<String>, TrackifyError>;
}

/// In-memory store. State does not survive a restart; used in tests and as
/// the fallback when no state path is configured.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<BTreeMap<String, TrackerSnapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, TrackerSnapshot>>, TrackifyError> {
        self.inner
            .lock()
            .map_err(|_| storage_error("snapshot store mutex poisoned"))
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self, device_id: &str) -> Result<Option<TrackerSnapshot>, TrackifyError> {
        Ok(self.lock()?.get(device_id).cloned())
    }

    fn save(&self, device_id: &str, snapshot: &TrackerSnapshot) -> Result<(), TrackifyError> {
        self.lock()?.insert(device_id.to_string(), snapshot.clone());
        Ok(())
    }

    fn device_ids(&self) -> Result<Vec<String>, TrackifyError> {
        Ok(self.lock()?.keys().cloned().collect())
    }
}

/// Store backed by a single JSON document on disk, so tracker state survives
/// process restarts.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    inner: Mutex<BTreeMap<String, TrackerSnapshot>>,
}

impl JsonFileStore {
    /// Open the store, loading any existing document. A missing file is an
    /// empty store, not an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, TrackifyError> {
        let path = path.into();
        let snapshots = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(err) if err.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(JsonFileStore {
            path,
            inner: Mutex::new(snapshots),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, TrackerSnapshot>>, TrackifyError> {
        self.inner
            .lock()
            .map_err(|_| storage_error("snapshot store mutex poisoned"))
    }

    fn persist(&self, snapshots: &BTreeMap<String, TrackerSnapshot>) -> Result<(), TrackifyError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_vec_pretty(snapshots)?)?;
        Ok(())
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self, device_id: &str) -> Result<Option<TrackerSnapshot>, TrackifyError> {
        Ok(self.lock()?.get(device_id).cloned())
    }

    fn save(&self, device_id: &str, snapshot: &TrackerSnapshot) -> Result<(), TrackifyError> {
        let mut snapshots = self.lock()?;
        snapshots.insert(device_id.to_string(), snapshot.clone());
        self.persist(&snapshots)
    }

    fn device_ids(&self) -> Result<Vec<String>, TrackifyError> {
        Ok(self.lock()?.keys().cloned().collect())
    }
}
