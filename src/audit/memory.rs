use std::sync::Mutex;

use super::{mirror, AuditSink};

/// In-memory audit sink for hosts that route events themselves.
#[derive(Default)]
pub struct MemoryAuditLog {
    lines: Mutex<Vec<String>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages recorded so far, oldest first.
    pub fn entries(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.entries().iter().any(|line| line.contains(needle))
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

impl AuditSink for MemoryAuditLog {
    fn record(&self, message: &str) {
        mirror(message);
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(message.to_string());
        }
    }
}
