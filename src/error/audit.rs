// Audit log error types
//
// These never cross the FFI boundary: every AuditSink swallows them. They
// exist so the file sink can be tested and so failures reach the diagnostic log.

use crate::error::ErrorCode;
use std::fmt;
use std::path::{Path, PathBuf};

/// Audit error code constants
///
/// Error code range: 3101-3102
pub struct AuditErrorCodes {}

impl AuditErrorCodes {
    /// Writing or opening the day file failed
    pub const IO: i32 = 3101;

    /// No log directory could be resolved or created
    pub const NO_LOG_DIRECTORY: i32 = 3102;
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuditError {
    /// Filesystem failure on the given path
    Io { path: PathBuf, details: String },

    /// The log directory could not be resolved or created
    NoLogDirectory,
}

impl AuditError {
    pub(crate) fn io(path: &Path, err: std::io::Error) -> Self {
        AuditError::Io {
            path: path.to_path_buf(),
            details: err.to_string(),
        }
    }
}

impl ErrorCode for AuditError {
    fn code(&self) -> i32 {
        match self {
            AuditError::Io { .. } => AuditErrorCodes::IO,
            AuditError::NoLogDirectory => AuditErrorCodes::NO_LOG_DIRECTORY,
        }
    }

    fn message(&self) -> String {
        match self {
            AuditError::Io { path, details } => {
                format!("Audit write to {} failed: {}", path.display(), details)
            }
            AuditError::NoLogDirectory => "Audit log directory is unavailable".to_string(),
        }
    }
}

impl fmt::Display for AuditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AuditError (code {}): {}", self.code(), self.message())
    }
}

impl std::error::Error for AuditError {}
