// File: crates/trackify_gpslogger/src/doc.rs
#![allow(dead_code)] // Allow dead code for doc functions

#[cfg(feature = "openapi")]
use utoipa::OpenApi;

// Define dummy functions with the handlers' attributes for utoipa
#[cfg(feature = "openapi")]
#[utoipa::path(
    post,
    path = "/api/gpslogger/webhook/{webhook_id}",
    params(
        ("webhook_id" = String, Path, description = "Configured webhook id")
    ),
    responses(
        (status = 200, description = "Location accepted, body `Setting location for {device}`"),
        (status = 404, description = "Webhook id not registered"),
        (status = 422, description = "Missing or malformed field, message as body")
    ),
    tag = "GPSLogger"
)]
fn doc_webhook_handler() {}

#[cfg(feature = "openapi")]
#[utoipa::path(
    get,
    path = "/api/gpslogger/devices",
    responses(
        (status = 200, description = "Known device ids in registration order")
    ),
    tag = "GPSLogger"
)]
fn doc_list_devices_handler() {}

#[cfg(feature = "openapi")]
#[utoipa::path(
    get,
    path = "/api/gpslogger/devices/{device_id}",
    params(
        ("device_id" = String, Path, description = "Normalized device id")
    ),
    responses(
        (status = 200, description = "Current tracker state projection"),
        (status = 404, description = "Unknown device")
    ),
    tag = "GPSLogger"
)]
fn doc_device_state_handler() {}

#[cfg(feature = "openapi")]
#[derive(OpenApi)]
#[openapi(
    paths(doc_webhook_handler, doc_list_devices_handler, doc_device_state_handler),
    tags(
        (name = "GPSLogger", description = "GPSLogger webhook ingestion and device tracking")
    )
)]
pub struct GpsloggerApiDoc;
