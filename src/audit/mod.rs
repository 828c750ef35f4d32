//! Audit trail for bridge activity.
//!
//! Every component reports notable events and all error paths here. Sinks are
//! infallible by signature: a failure to record is swallowed and can never
//! change the outcome of the operation that produced the event.

mod file;
mod memory;

use std::sync::Arc;

use once_cell::sync::Lazy;

pub use file::{DailyFileLog, LOG_DIR_ENV};
pub use memory::MemoryAuditLog;

/// Append-only destination for audit events.
pub trait AuditSink: Send + Sync {
    /// Record one event. Must not panic and must not surface errors.
    fn record(&self, message: &str);
}

/// Process-wide default sink; its directory is resolved on first record.
static GLOBAL: Lazy<Arc<DailyFileLog>> = Lazy::new(|| Arc::new(DailyFileLog::new()));

/// Access the process-wide audit sink.
pub fn global() -> Arc<dyn AuditSink> {
    GLOBAL.clone()
}

/// Record an event on the process-wide sink.
pub fn log(message: &str) {
    GLOBAL.record(message);
}

fn mirror(message: &str) {
    log::debug!(target: "audit", "{}", message);
}
