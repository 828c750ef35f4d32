// Public API for flutter_rust_bridge integration
// This module is the caller-facing surface of the bridge: one opaque handle per
// workspace engine, plus a few stateless helpers.

#![allow(dead_code)] // FFI functions are called from the host, not detected by Rust analyzer

use std::sync::{Mutex, MutexGuard};

use anyhow::Result;
use flutter_rust_bridge::frb;

use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::gateway::FailurePolicy;
use crate::session::EngineSession;
use crate::variant::{self, Variant};

// Re-export error code constants for FFI exposure
pub use crate::error::BridgeErrorCodes;

/// Handle to one workspace engine
///
/// Owns an [`EngineSession`] behind a mutex: the engine is non-reentrant, so
/// concurrent host calls are serialized here. Dropping the handle tears the
/// engine down if `dispose` was never called.
#[frb(opaque)]
pub struct WorkspaceBridge {
    session: Mutex<EngineSession>,
}

impl WorkspaceBridge {
    /// Open the engine named by the configuration file
    ///
    /// See [`BridgeConfig::load`] for where the file is looked up.
    ///
    /// # Errors
    /// - `EngineInit` if the engine cannot be created under the strict
    ///   construction policy
    #[frb(sync)]
    pub fn open() -> Result<WorkspaceBridge, BridgeError> {
        Self::open_with_config(BridgeConfig::load())
    }

    /// Open an engine with an explicit configuration
    #[frb(sync)]
    pub fn open_with_config(config: BridgeConfig) -> Result<WorkspaceBridge, BridgeError> {
        Ok(Self::from_session(EngineSession::from_config(&config)?))
    }

    /// Wrap a session opened by a Rust embedder
    #[frb(ignore)]
    pub fn from_session(session: EngineSession) -> Self {
        Self {
            session: Mutex::new(session),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, EngineSession>, BridgeError> {
        self.session.lock().map_err(|_| BridgeError::LockPoisoned {
            component: "engine_session".to_string(),
        })
    }

    /// Workspace application directory
    #[frb(sync, getter)]
    pub fn sys_dir(&self) -> Result<String, BridgeError> {
        self.lock()?.sys_dir()
    }

    /// Working/user directory
    #[frb(sync, getter)]
    pub fn user_dir(&self) -> Result<String, BridgeError> {
        self.lock()?.user_dir()
    }

    #[frb(sync, getter)]
    pub fn product_version(&self) -> Result<String, BridgeError> {
        self.lock()?.product_version()
    }

    #[frb(sync, getter)]
    pub fn engine_version(&self) -> Result<String, BridgeError> {
        self.lock()?.engine_version()
    }

    #[frb(sync, getter)]
    pub fn current_client(&self) -> Result<String, BridgeError> {
        self.lock()?.current_client()
    }

    /// Which failure mode `invoke` is running under
    ///
    /// Under `DegradeToValue`, failures come back as `[1, message]` values
    /// instead of errors.
    #[frb(sync, getter)]
    pub fn failure_policy(&self) -> Result<FailurePolicy, BridgeError> {
        Ok(self.lock()?.failure_policy())
    }

    /// Call a workspace function by name
    ///
    /// # Arguments
    /// * `function_name` - Workspace function to run
    /// * `parameters` - Parameter bundle, passed through verbatim (empty string when absent)
    ///
    /// # Returns
    /// The function's result with every rank-2 array transposed
    #[frb(sync)]
    pub fn invoke(
        &self,
        function_name: String,
        parameters: Option<Variant>,
    ) -> Result<Variant, BridgeError> {
        self.lock()?.invoke(&function_name, parameters)
    }

    /// JSON flavour of [`WorkspaceBridge::invoke`] for hosts without a variant mapping
    #[frb(sync)]
    pub fn invoke_json(
        &self,
        function_name: String,
        parameters_json: Option<String>,
    ) -> Result<String, BridgeError> {
        let parameters = match parameters_json {
            Some(text) => {
                let value: serde_json::Value =
                    serde_json::from_str(&text).map_err(|err| BridgeError::Call {
                        function: function_name.clone(),
                        reason: format!("parameters are not valid JSON: {}", err),
                    })?;
                Some(Variant::from_json(&value)?)
            }
            None => None,
        };
        let result = self.invoke(function_name, parameters)?;
        Ok(result.to_json().to_string())
    }

    /// Integer addition evaluated by the engine
    #[frb(sync)]
    pub fn add(&self, x: i32, y: i32) -> Result<i32, BridgeError> {
        self.lock()?.add(x, y)
    }

    /// Shut the engine down and release it
    ///
    /// Safe to call more than once; only the first call can fail.
    #[frb(sync)]
    pub fn dispose(&self) -> Result<(), BridgeError> {
        self.lock()?.teardown()
    }
}

/// Get the version of the bridge
#[frb(sync)]
pub fn get_version() -> Result<String> {
    Ok(env!("CARGO_PKG_VERSION").to_string())
}

/// Get BridgeErrorCodes as a structured object with all error code constants
#[frb(sync)]
pub fn get_bridge_error_codes() -> BridgeErrorCodes {
    BridgeErrorCodes {}
}

/// Transpose a rank-2 array; anything else comes back unchanged
#[frb(sync)]
pub fn transpose_array(value: Variant) -> Variant {
    variant::transpose_variant(&value)
}

/// Install the diagnostic log subscriber
#[frb(sync)]
pub fn init_bridge_logging() {
    crate::init_logging();
}

#[cfg(test)]
mod tests;
