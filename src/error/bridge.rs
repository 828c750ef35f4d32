// Bridge error types and constants

use crate::error::ErrorCode;
use flutter_rust_bridge::frb;
use log::error;
use std::fmt;

/// Bridge error code constants exposed to foreign callers via FFI
///
/// These constants provide a single source of truth for error codes
/// shared between Rust and the host. The flutter_rust_bridge will
/// generate corresponding host-side constants.
///
/// Error code range: 3001-3008
#[frb(unignore)]
pub struct BridgeErrorCodes {}

#[frb]
impl BridgeErrorCodes {
    /// Engine instance could not be created
    pub const ENGINE_INIT: i32 = 3001;

    /// Engine channel failed or the engine is mid-shutdown
    pub const TRANSPORT: i32 = 3002;

    /// The named function raised inside the engine or returned malformed data
    pub const CALL_FAILED: i32 = 3003;

    /// Array data does not match its declared shape
    pub const INVALID_SHAPE: i32 = 3004;

    /// Session has no live engine (torn down or never created)
    pub const SESSION_CLOSED: i32 = 3005;

    /// Mutex guarding the session was poisoned
    pub const LOCK_POISONED: i32 = 3006;

    /// Configuration could not be applied
    pub const CONFIG: i32 = 3007;

    /// A host value cannot be represented as an engine value
    pub const MARSHAL: i32 = 3008;

    /// Get ENGINE_INIT error code
    #[flutter_rust_bridge::frb(sync, getter)]
    pub fn engine_init() -> i32 {
        Self::ENGINE_INIT
    }

    /// Get TRANSPORT error code
    #[flutter_rust_bridge::frb(sync, getter)]
    pub fn transport() -> i32 {
        Self::TRANSPORT
    }

    /// Get CALL_FAILED error code
    #[flutter_rust_bridge::frb(sync, getter)]
    pub fn call_failed() -> i32 {
        Self::CALL_FAILED
    }

    /// Get INVALID_SHAPE error code
    #[flutter_rust_bridge::frb(sync, getter)]
    pub fn invalid_shape() -> i32 {
        Self::INVALID_SHAPE
    }

    /// Get SESSION_CLOSED error code
    #[flutter_rust_bridge::frb(sync, getter)]
    pub fn session_closed() -> i32 {
        Self::SESSION_CLOSED
    }

    /// Get LOCK_POISONED error code
    #[flutter_rust_bridge::frb(sync, getter)]
    pub fn lock_poisoned() -> i32 {
        Self::LOCK_POISONED
    }

    /// Get CONFIG error code
    #[flutter_rust_bridge::frb(sync, getter)]
    pub fn config() -> i32 {
        Self::CONFIG
    }

    /// Get MARSHAL error code
    #[flutter_rust_bridge::frb(sync, getter)]
    pub fn marshal() -> i32 {
        Self::MARSHAL
    }
}

/// Log a bridge error with structured context
///
/// Goes to the diagnostic `log` facade, not the audit trail.
pub fn log_bridge_error(err: &BridgeError, context: &str) {
    error!(
        "Bridge error in {}: code={}, component=WorkspaceBridge, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Errors raised by the engine boundary, the dispatch gateway and the session
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeError {
    /// Engine instance could not be created
    EngineInit { reason: String },

    /// Underlying call mechanism failed (engine gone or shutting down)
    Transport { reason: String },

    /// The named function raised inside the engine or returned malformed data
    Call { function: String, reason: String },

    /// Array element count does not match the product of its shape
    InvalidShape { expected: usize, actual: usize },

    /// Session has no live engine
    SessionClosed,

    /// Mutex/RwLock was poisoned
    LockPoisoned { component: String },

    /// Configuration could not be applied
    Config { reason: String },

    /// A host value has no engine representation
    Marshal { reason: String },
}

impl BridgeError {
    /// Transport failures are expected while the engine shuts down.
    pub fn is_transport(&self) -> bool {
        matches!(self, BridgeError::Transport { .. })
    }
}

impl ErrorCode for BridgeError {
    fn code(&self) -> i32 {
        match self {
            BridgeError::EngineInit { .. } => BridgeErrorCodes::ENGINE_INIT,
            BridgeError::Transport { .. } => BridgeErrorCodes::TRANSPORT,
            BridgeError::Call { .. } => BridgeErrorCodes::CALL_FAILED,
            BridgeError::InvalidShape { .. } => BridgeErrorCodes::INVALID_SHAPE,
            BridgeError::SessionClosed => BridgeErrorCodes::SESSION_CLOSED,
            BridgeError::LockPoisoned { .. } => BridgeErrorCodes::LOCK_POISONED,
            BridgeError::Config { .. } => BridgeErrorCodes::CONFIG,
            BridgeError::Marshal { .. } => BridgeErrorCodes::MARSHAL,
        }
    }

    fn message(&self) -> String {
        match self {
            BridgeError::EngineInit { reason } => {
                format!("Workspace engine could not be created: {}", reason)
            }
            BridgeError::Transport { reason } => {
                format!("Engine transport failure: {}", reason)
            }
            BridgeError::Call { function, reason } => {
                format!("Function {} failed: {}", function, reason)
            }
            BridgeError::InvalidShape { expected, actual } => {
                format!(
                    "Array shape expects {} elements but {} were supplied",
                    expected, actual
                )
            }
            BridgeError::SessionClosed => {
                "Workspace engine is not available. Open a new session.".to_string()
            }
            BridgeError::LockPoisoned { component } => {
                format!("Lock poisoned on {}", component)
            }
            BridgeError::Config { reason } => format!("Invalid configuration: {}", reason),
            BridgeError::Marshal { reason } => format!("Value cannot be marshaled: {}", reason),
        }
    }
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BridgeError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for BridgeError {}
