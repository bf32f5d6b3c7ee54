// --- File: crates/trackify_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

// --- GPSLogger Config ---
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct GpsloggerConfig {
    /// The webhook id clients must address their reports to.
    /// Loaded via TRACKIFY__GPSLOGGER__WEBHOOK_ID or from the config file.
    pub webhook_id: String,
    /// Where the JSON snapshot store keeps per-device state.
    #[serde(default)]
    pub state_path: Option<String>,
}

// --- Unified App Configuration ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    // Server config is mandatory
    #[serde(default)]
    pub server: ServerConfig,

    // --- Optional Feature Configurations ---
    #[serde(default)]
    pub gpslogger: Option<GpsloggerConfig>,
}
