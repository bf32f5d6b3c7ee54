// --- File: crates/trackify_gpslogger/src/lib.rs ---
// Declare modules within this crate
pub mod doc;
pub mod handlers;
pub mod logic;
pub mod registry;
#[cfg(test)]
mod registry_test;
pub mod routes;
pub mod store;
pub mod tracker;

// Re-export the routes function to be used by the main backend service
pub use routes::routes;
