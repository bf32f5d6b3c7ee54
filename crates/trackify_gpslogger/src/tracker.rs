// --- File: crates/trackify_gpslogger/src/tracker.rs ---

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::logic::{parse_datetime, LocationReading, TrackerAttributes, DOMAIN};
use crate::store::TrackerSnapshot;

/// Source of a tracker's position fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Gps,
}

/// Device-grouping descriptor exposed to the external observer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    /// `(namespace, device_id)` pair identifying the device.
    pub identifiers: (String, String),
    pub name: String,
}

/// The payload broadcast to every registered sink for each accepted reading.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerUpdate {
    pub device: String,
    pub location: (f64, f64),
    pub battery: f64,
    pub accuracy: f64,
    pub attributes: TrackerAttributes,
}

impl From<&LocationReading> for TrackerUpdate {
    fn from(reading: &LocationReading) -> Self {
        TrackerUpdate {
            device: reading.device.clone(),
            location: (reading.latitude, reading.longitude),
            battery: reading.battery,
            accuracy: reading.accuracy,
            attributes: reading.attributes(),
        }
    }
}

// The -1 default is a sentinel for "not reported"; never surface it.
fn round_battery(battery: f64) -> Option<i64> {
    if battery < 0.0 {
        None
    } else {
        Some(battery.round() as i64)
    }
}

/// Per-device sink holding the last-known reading.
///
/// Constructed either with an initial update (active immediately) or from a
/// device id alone, in which case [`TrackerEntity::restore`] must run before
/// live updates are meaningful.
#[derive(Debug, Clone)]
pub struct TrackerEntity {
    device_id: String,
    location: Option<(f64, f64)>,
    accuracy: i64,
    battery: Option<i64>,
    attributes: TrackerAttributes,
    prv_seen: Option<DateTime<Utc>>,
}

impl TrackerEntity {
    /// Set up an active entity from its first live update.
    pub fn with_reading(update: &TrackerUpdate) -> Self {
        TrackerEntity {
            device_id: update.device.clone(),
            location: Some(update.location),
            accuracy: update.accuracy.round() as i64,
            battery: round_battery(update.battery),
            attributes: update.attributes.clone(),
            prv_seen: update.attributes.last_seen,
        }
    }

    /// Set up an entity awaiting either a live update or a restored snapshot.
    pub fn from_device_id(device_id: impl Into<String>) -> Self {
        TrackerEntity {
            device_id: device_id.into(),
            location: None,
            accuracy: 0,
            battery: None,
            attributes: TrackerAttributes::default(),
            prv_seen: None,
        }
    }

    /// Adopt a persisted snapshot as the current state.
    ///
    /// Invoked once at attach time. With no prior snapshot, all optional
    /// fields stay absent and accuracy is 0.
    pub fn restore(&mut self, snapshot: Option<&TrackerSnapshot>) {
        // don't restore if we got created with data
        if self.location.is_some() {
            return;
        }

        let Some(state) = snapshot else {
            self.location = None;
            self.accuracy = 0;
            self.battery = None;
            self.attributes = TrackerAttributes::default();
            self.prv_seen = None;
            return;
        };

        self.location = match (state.latitude, state.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        };
        self.accuracy = state.gps_accuracy.unwrap_or(0.0).round() as i64;
        // Timestamps are persisted as strings. Convert back.
        let last_seen = state.last_seen.as_deref().and_then(parse_datetime);
        self.prv_seen = last_seen;
        self.attributes = TrackerAttributes {
            activity: state.activity.clone(),
            altitude: state.altitude,
            battery_charging: state.battery_charging,
            direction: state.direction,
            last_seen,
            provider: state.provider.clone(),
            speed: state.speed,
        };
        self.battery = state.battery_level.map(|level| level.round() as i64);
    }

    /// Apply a broadcast update; returns whether visible state changed.
    ///
    /// No-op for other devices' updates (every sink self-filters) and for
    /// reports whose `last_seen` is strictly older than the watermark.
    pub fn apply_update(&mut self, update: &TrackerUpdate) -> bool {
        if update.device != self.device_id {
            return false;
        }

        let last_seen = update.attributes.last_seen;
        if let (Some(prv_seen), Some(seen)) = (self.prv_seen, last_seen) {
            if seen < prv_seen {
                debug!(
                    "{}: skipping update because last_seen went backwards: {} < {}",
                    self.device_id, seen, prv_seen
                );
                return false;
            }
        }

        self.location = Some(update.location);
        self.battery = round_battery(update.battery);
        self.accuracy = update.accuracy.round() as i64;
        self.attributes = update.attributes.clone();
        self.prv_seen = last_seen;
        true
    }

    /// The state persisted for this entity, timestamps as RFC 3339 strings.
    pub fn snapshot(&self) -> TrackerSnapshot {
        TrackerSnapshot {
            latitude: self.latitude(),
            longitude: self.longitude(),
            gps_accuracy: Some(self.accuracy as f64),
            battery_level: self.battery.map(|level| level as f64),
            activity: self.attributes.activity.clone(),
            altitude: self.attributes.altitude,
            battery_charging: self.attributes.battery_charging,
            direction: self.attributes.direction,
            last_seen: self.attributes.last_seen.map(|seen| seen.to_rfc3339()),
            provider: self.attributes.provider.clone(),
            speed: self.attributes.speed,
        }
    }

    // --- Read-only projections ---

    /// Battery value of the device, absent when unknown.
    pub fn battery_level(&self) -> Option<i64> {
        self.battery
    }

    /// Device specific attributes.
    pub fn extra_state_attributes(&self) -> &TrackerAttributes {
        &self.attributes
    }

    pub fn latitude(&self) -> Option<f64> {
        self.location.map(|location| location.0)
    }

    pub fn longitude(&self) -> Option<f64> {
        self.location.map(|location| location.1)
    }

    /// The gps accuracy of the device, rounded to whole meters.
    pub fn location_accuracy(&self) -> i64 {
        self.accuracy
    }

    pub fn unique_id(&self) -> &str {
        &self.device_id
    }

    pub fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            identifiers: (DOMAIN.to_string(), self.device_id.clone()),
            name: self.device_id.clone(),
        }
    }

    pub fn source_type(&self) -> SourceType {
        SourceType::Gps
    }
}
