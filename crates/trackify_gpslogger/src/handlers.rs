// --- File: crates/trackify_gpslogger/src/handlers.rs ---
use crate::logic::{TrackerAttributes, WebhookValidator};
use crate::registry::TrackerRegistry;
use crate::tracker::{DeviceInfo, SourceType, TrackerUpdate};
use axum::{
    extract::{Form, Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::error;
use trackify_common::HttpStatusCode;
use trackify_config::AppConfig;

// Define shared state needed by GPSLogger handlers
pub struct GpsloggerState {
    pub config: Arc<AppConfig>,
    pub validator: WebhookValidator,
    pub registry: Arc<TrackerRegistry>,
}

fn error_response<E: HttpStatusCode + fmt::Display>(error: E) -> (StatusCode, String) {
    let status = StatusCode::from_u16(error.status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, error.to_string())
}

/// Handler for inbound GPSLogger location reports.
///
/// Validates the form payload, broadcasts the normalized reading to every
/// registered tracker, and answers with plain text. Validation failures are
/// caller-correctable and come back as 422 with the message as body.
#[axum::debug_handler]
pub async fn webhook_handler(
    State(state): State<Arc<GpsloggerState>>, // Extract shared GPSLogger state
    Path(webhook_id): Path<String>,
    Form(data): Form<HashMap<String, String>>, // Untyped form body
) -> Result<String, (StatusCode, String)> {
    let configured_id = state
        .config
        .gpslogger
        .as_ref()
        .map(|gpslogger| gpslogger.webhook_id.as_str());
    if configured_id != Some(webhook_id.as_str()) {
        return Err((StatusCode::NOT_FOUND, "Webhook not registered".to_string()));
    }

    let reading = state.validator.validate(&data).map_err(error_response)?;

    let update = TrackerUpdate::from(&reading);
    if let Err(err) = state.registry.dispatch(&update) {
        // The reading was applied in memory; only persistence failed.
        error!("failed to persist state for {}: {}", update.device, err);
    }

    Ok(format!("Setting location for {}", update.device))
}

#[derive(Serialize)]
pub struct DeviceListResponse {
    pub devices: Vec<String>,
}

/// Handler returning every known device id, in registration order.
#[axum::debug_handler]
pub async fn list_devices_handler(
    State(state): State<Arc<GpsloggerState>>,
) -> Result<Json<DeviceListResponse>, (StatusCode, String)> {
    let devices = state.registry.devices().map_err(error_response)?;
    Ok(Json(DeviceListResponse { devices }))
}

#[derive(Serialize)]
pub struct DeviceStateResponse {
    pub device_id: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub gps_accuracy: i64,
    pub battery_level: Option<i64>,
    pub source_type: SourceType,
    pub attributes: TrackerAttributes,
    pub device_info: DeviceInfo,
}

/// Handler projecting one tracker's current state.
#[axum::debug_handler]
pub async fn device_state_handler(
    State(state): State<Arc<GpsloggerState>>,
    Path(device_id): Path<String>,
) -> Result<Json<DeviceStateResponse>, (StatusCode, String)> {
    let response = state
        .registry
        .with_entity(&device_id, |entity| DeviceStateResponse {
            device_id: entity.unique_id().to_string(),
            latitude: entity.latitude(),
            longitude: entity.longitude(),
            gps_accuracy: entity.location_accuracy(),
            battery_level: entity.battery_level(),
            source_type: entity.source_type(),
            attributes: entity.extra_state_attributes().clone(),
            device_info: entity.device_info(),
        })
        .map_err(error_response)?;

    match response {
        Some(response) => Ok(Json(response)),
        None => Err((
            StatusCode::NOT_FOUND,
            format!("Unknown device: {device_id}"),
        )),
    }
}
