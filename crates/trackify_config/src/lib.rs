// --- File: crates/trackify_config/src/lib.rs ---
use config::{Config, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use std::env;
use std::path::PathBuf;

pub mod models;
pub use models::*;

static DOTENV_LOADED: OnceCell<()> = OnceCell::new();

/// Loads `.env` once per process so repeated config loads stay cheap.
pub fn ensure_dotenv_loaded() {
    DOTENV_LOADED.get_or_init(|| {
        let _ = dotenv::dotenv();
    });
}

/// Loads the unified application configuration.
///
/// Sources, later ones overriding earlier ones:
/// 1. `config/default` (any format the `config` crate understands, optional)
/// 2. `config/{RUN_ENV}` (optional, `RUN_ENV` defaults to `debug`)
/// 3. Environment variables prefixed with `TRACKIFY`, e.g.
///    `TRACKIFY__SERVER__PORT=9000` or `TRACKIFY__GPSLOGGER__WEBHOOK_ID=abc`.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());
    let prefix = env::var("PREFIX").unwrap_or_else(|_| "TRACKIFY".to_string());

    let config_dir = env::var("TRACKIFY_CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config"));

    let default_path = config_dir.join("default");
    let env_path = config_dir.join(&run_env);

    let builder = Config::builder()
        .add_source(File::with_name(&default_path.to_string_lossy()).required(false))
        .add_source(File::with_name(&env_path.to_string_lossy()).required(false))
        .add_source(Environment::with_prefix(&prefix).separator("__"));

    builder.build()?.try_deserialize()
}
