//! Configuration management for the bridge
//!
//! Runtime configuration is loaded from a JSON file so hosts can switch the
//! engine binding, the failure policy and the audit location without
//! rebuilding. A missing or invalid file falls back to defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::engine::SCRIPTED_ENGINE;
use crate::gateway::FailurePolicy;
use crate::session::ConstructionPolicy;

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "WSBRIDGE_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "bridge_config.json";

/// Complete bridge configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Name of the registered engine factory to open
    pub engine: String,
    /// Workspace function that trampolines into the named target
    pub dispatch_function: String,
    /// How dispatch failures reach the caller
    pub failure_policy: FailurePolicy,
    /// Whether engine creation failures are raised or logged
    pub construction_policy: ConstructionPolicy,
    /// Audit directory; the process-wide default when unset
    pub audit_dir: Option<PathBuf>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            engine: SCRIPTED_ENGINE.to_string(),
            dispatch_function: "API_Call".to_string(),
            failure_policy: FailurePolicy::default(),
            construction_policy: ConstructionPolicy::default(),
            audit_dir: None,
        }
    }
}

impl BridgeConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// The loaded configuration, or the defaults if the file doesn't exist
    /// or the JSON is invalid
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Load from `$WSBRIDGE_CONFIG`, else `bridge_config.json` in the
    /// working directory.
    pub fn load() -> Self {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load_from_file(PathBuf::from(path)),
            None => Self::load_from_file(DEFAULT_CONFIG_PATH),
        }
    }
}
