// --- File: crates/trackify_gpslogger/src/routes.rs ---

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tracing::{info, warn};
use trackify_config::AppConfig;

use crate::handlers::{
    device_state_handler, list_devices_handler, webhook_handler, GpsloggerState,
};
use crate::logic::WebhookValidator;
use crate::registry::TrackerRegistry;
use crate::store::SnapshotStore;

/// Creates a router containing all routes for the GPSLogger feature.
///
/// Builds the tracker registry around the given snapshot store and
/// re-attaches previously persisted devices before any webhook can land.
///
/// # Arguments
/// * `config` - Shared application configuration (`Arc<AppConfig>`).
/// * `store` - Snapshot store the registry persists through.
pub fn routes(config: Arc<AppConfig>, store: Arc<dyn SnapshotStore>) -> Router {
    let registry = Arc::new(TrackerRegistry::new(store));
    match registry.restore_known_devices() {
        Ok(count) if count > 0 => info!("restored {count} previously tracked devices"),
        Ok(_) => {}
        Err(err) => warn!("failed to restore tracker state: {err}"),
    }

    let state = Arc::new(GpsloggerState {
        config,
        validator: WebhookValidator::new(),
        registry,
    });

    Router::new()
        // Endpoint called by the GPSLogger mobile client
        .route("/gpslogger/webhook/{webhook_id}", post(webhook_handler))
        // Observer surface: current tracker state
        .route("/gpslogger/devices", get(list_devices_handler))
        .route("/gpslogger/devices/{device_id}", get(device_state_handler))
        .with_state(state)
}
