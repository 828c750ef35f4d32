// Error types for the workspace bridge
//
// This module defines custom error types for engine dispatch and audit logging,
// providing structured error handling with error codes suitable for FFI communication.

mod audit;
mod bridge;

pub use audit::{AuditError, AuditErrorCodes};
pub use bridge::{log_bridge_error, BridgeError, BridgeErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error handling across
/// the FFI boundary.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
