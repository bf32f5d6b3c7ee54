// --- File: crates/trackify_gpslogger/src/logic.rs ---

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tracing::warn;

use trackify_common::HttpStatusCode;

/// Integration identifier, also the device-grouping namespace.
pub const DOMAIN: &str = "gpslogger";

// Form keys accepted by the webhook (case-sensitive).
pub const ATTR_ACCURACY: &str = "accuracy";
pub const ATTR_ACTIVITY: &str = "activity";
pub const ATTR_ALTITUDE: &str = "altitude";
pub const ATTR_BATTERY: &str = "battery";
pub const ATTR_BATTERY_CHARGING: &str = "battery_charging";
pub const ATTR_DEVICE: &str = "device";
pub const ATTR_DIRECTION: &str = "direction";
pub const ATTR_LAST_SEEN: &str = "last_seen";
pub const ATTR_LATITUDE: &str = "latitude";
pub const ATTR_LONGITUDE: &str = "longitude";
pub const ATTR_PROVIDER: &str = "provider";
pub const ATTR_SPEED: &str = "speed";

/// Radius of uncertainty assumed when the client does not report one (meters).
pub const DEFAULT_ACCURACY: f64 = 200.0;
/// Sentinel battery value meaning "not reported".
pub const DEFAULT_BATTERY: f64 = -1.0;

// --- Error Handling ---
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
    #[error("invalid value '{value}' for field '{field}': {reason}")]
    InvalidValue {
        field: &'static str,
        value: String,
        reason: String,
    },
}

impl HttpStatusCode for ValidationError {
    fn status_code(&self) -> u16 {
        // Malformed input is a caller-correctable condition
        422
    }
}

// --- Data Structures ---

/// The optional metadata reported alongside a position.
///
/// A broadcast update always carries the full set of keys, so assigning a new
/// `TrackerAttributes` is the key-wise overwrite of the previous one.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrackerAttributes {
    pub activity: Option<String>,
    pub altitude: Option<f64>,
    pub battery_charging: Option<bool>,
    pub direction: Option<f64>,
    pub last_seen: Option<DateTime<Utc>>,
    pub provider: Option<String>,
    pub speed: Option<f64>,
}

/// One normalized location report from a device. Immutable once validated.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationReading {
    /// Normalized device id (hyphens stripped).
    pub device: String,
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: f64,
    pub battery: f64,
    pub activity: Option<String>,
    pub altitude: Option<f64>,
    pub battery_charging: Option<bool>,
    pub direction: Option<f64>,
    pub last_seen: Option<DateTime<Utc>>,
    pub provider: Option<String>,
    pub speed: Option<f64>,
}

impl LocationReading {
    /// The attribute set broadcast with this reading. Every key is present;
    /// unreported fields are carried as None.
    pub fn attributes(&self) -> TrackerAttributes {
        TrackerAttributes {
            activity: self.activity.clone(),
            altitude: self.altitude,
            battery_charging: self.battery_charging,
            direction: self.direction,
            last_seen: self.last_seen,
            provider: self.provider.clone(),
            speed: self.speed,
        }
    }
}

/// Coerce a device id by removing '-', so UUID-style ids submitted with or
/// without separators map to the same identity.
pub fn normalize_device_id(value: &str) -> String {
    value.replace('-', "")
}

/// Parse a persisted or reported timestamp. Accepts RFC 3339 and a naive
/// `YYYY-MM-DDTHH:MM:SS[.f]` (assumed UTC).
pub fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }
    None
}

fn coerce_float(field: &'static str, value: &str) -> Result<f64, ValidationError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| ValidationError::InvalidValue {
            field,
            value: value.to_string(),
            reason: "expected a number".to_string(),
        })
}

fn coerce_bool(field: &'static str, value: &str) -> Result<bool, ValidationError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" | "enable" => Ok(true),
        "0" | "false" | "no" | "off" | "disable" => Ok(false),
        _ => Err(ValidationError::InvalidValue {
            field,
            value: value.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}

fn required_float(
    data: &HashMap<String, String>,
    field: &'static str,
    min: f64,
    max: f64,
) -> Result<f64, ValidationError> {
    let raw = data
        .get(field)
        .ok_or(ValidationError::MissingField(field))?;
    let value = coerce_float(field, raw)?;
    if !(min..=max).contains(&value) {
        return Err(ValidationError::InvalidValue {
            field,
            value: raw.clone(),
            reason: format!("must be between {min} and {max}"),
        });
    }
    Ok(value)
}

fn optional_float(
    data: &HashMap<String, String>,
    field: &'static str,
) -> Result<Option<f64>, ValidationError> {
    data.get(field).map(|raw| coerce_float(field, raw)).transpose()
}

/// Validates inbound webhook payloads into [`LocationReading`]s.
///
/// Owns the process-wide "no last_seen" advisory flag, which resets only on
/// process restart.
#[derive(Debug, Default)]
pub struct WebhookValidator {
    warned_no_last_seen: AtomicBool,
}

impl WebhookValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an untyped key/value payload into a typed reading.
    ///
    /// Applies defaults for accuracy (200) and battery (-1), normalizes the
    /// device id, and rejects missing or malformed required fields. Emits a
    /// one-time advisory the first time a valid payload omits `last_seen`.
    pub fn validate(
        &self,
        data: &HashMap<String, String>,
    ) -> Result<LocationReading, ValidationError> {
        let device = data
            .get(ATTR_DEVICE)
            .filter(|value| !value.is_empty())
            .ok_or(ValidationError::MissingField(ATTR_DEVICE))?;

        let latitude = required_float(data, ATTR_LATITUDE, -90.0, 90.0)?;
        let longitude = required_float(data, ATTR_LONGITUDE, -180.0, 180.0)?;
        let accuracy = optional_float(data, ATTR_ACCURACY)?.unwrap_or(DEFAULT_ACCURACY);
        let battery = optional_float(data, ATTR_BATTERY)?.unwrap_or(DEFAULT_BATTERY);

        let battery_charging = data
            .get(ATTR_BATTERY_CHARGING)
            .map(|raw| coerce_bool(ATTR_BATTERY_CHARGING, raw))
            .transpose()?;

        let last_seen = data
            .get(ATTR_LAST_SEEN)
            .map(|raw| {
                parse_datetime(raw).ok_or_else(|| ValidationError::InvalidValue {
                    field: ATTR_LAST_SEEN,
                    value: raw.clone(),
                    reason: "expected an ISO 8601 timestamp".to_string(),
                })
            })
            .transpose()?;

        let reading = LocationReading {
            device: normalize_device_id(device),
            latitude,
            longitude,
            accuracy,
            battery,
            activity: data.get(ATTR_ACTIVITY).cloned(),
            altitude: optional_float(data, ATTR_ALTITUDE)?,
            battery_charging,
            direction: optional_float(data, ATTR_DIRECTION)?,
            last_seen,
            provider: data.get(ATTR_PROVIDER).cloned(),
            speed: optional_float(data, ATTR_SPEED)?,
        };

        if reading.last_seen.is_none() && !self.warned_no_last_seen.swap(true, Ordering::Relaxed)
        {
            warn!(
                "HTTP body does not contain {}. Consider adding it for better results",
                ATTR_LAST_SEEN
            );
        }

        Ok(reading)
    }

    /// Whether the "no last_seen" advisory has fired this process lifetime.
    pub fn has_warned_no_last_seen(&self) -> bool {
        self.warned_no_last_seen.load(Ordering::Relaxed)
    }
}
