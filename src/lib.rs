// Workspace Bridge - dispatch and marshaling layer over the workspace engine
// Exposes a dynamically typed, array-oriented interpreter through a fixed,
// statically typed calling convention.

// Module declarations
pub mod api;
pub mod audit;
pub mod config;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod session;
pub mod variant;

// Re-exports for convenience
pub use api::*;

use std::str::FromStr;

/// Environment variable selecting the diagnostic log level (default `info`)
pub const LOG_LEVEL_ENV: &str = "WSBRIDGE_LOG";

/// Install the `tracing` fmt subscriber and route `log` records into it.
///
/// Safe to call repeatedly; only the first call installs anything.
pub fn init_logging() {
    let level = std::env::var(LOG_LEVEL_ENV)
        .ok()
        .and_then(|value| tracing::Level::from_str(&value).ok())
        .unwrap_or(tracing::Level::INFO);

    if tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
    {
        log::info!("Workspace bridge logging initialized at {}", level);
    }
}
