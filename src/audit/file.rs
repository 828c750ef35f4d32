// DailyFileLog: one plain-text file per calendar day
//
// Line format: `<yyyyMMddHHmmssfff>:  <message>` in local time, appended to
// `<dir>/log_<yyyyMMdd>.txt`. The directory is resolved once and created on
// first use if absent.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use once_cell::sync::OnceCell;

use super::{mirror, AuditSink};
use crate::error::AuditError;

/// Environment variable overriding the default log directory
pub const LOG_DIR_ENV: &str = "WSBRIDGE_LOG_DIR";

const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S%3f";
const DAY_FORMAT: &str = "%Y%m%d";

/// File-backed audit sink keyed by the day of each record.
pub struct DailyFileLog {
    root: Option<PathBuf>,
    folder: OnceCell<PathBuf>,
}

impl DailyFileLog {
    /// Sink rooted at the default location (see [`DailyFileLog::default_dir`]).
    pub fn new() -> Self {
        Self {
            root: None,
            folder: OnceCell::new(),
        }
    }

    /// Sink rooted at an explicit directory.
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(dir.into()),
            folder: OnceCell::new(),
        }
    }

    /// `$WSBRIDGE_LOG_DIR`, else `<data dir>/WorkspaceBridge/Log`, else the
    /// same path under the temp directory.
    pub fn default_dir() -> PathBuf {
        if let Some(dir) = std::env::var_os(LOG_DIR_ENV) {
            return PathBuf::from(dir);
        }
        dirs::data_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("WorkspaceBridge")
            .join("Log")
    }

    /// Directory this sink writes to; fixed after the first call.
    pub fn folder(&self) -> &Path {
        self.folder.get_or_init(|| {
            let dir = self.root.clone().unwrap_or_else(Self::default_dir);
            if let Err(err) = fs::create_dir_all(&dir) {
                log::warn!("[Audit] Could not create {}: {}", dir.display(), err);
            }
            dir
        })
    }

    /// Path of the day file a record made at `at` lands in.
    pub fn file_for(&self, at: &DateTime<Local>) -> PathBuf {
        self.folder()
            .join(format!("log_{}.txt", at.format(DAY_FORMAT)))
    }

    /// Append one line, reporting failures instead of swallowing them.
    pub fn try_record(&self, message: &str) -> Result<(), AuditError> {
        let now = Local::now();
        let folder = self.folder();
        if !folder.is_dir() {
            fs::create_dir_all(folder).map_err(|_| AuditError::NoLogDirectory)?;
        }

        let path = self.file_for(&now);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|err| AuditError::io(&path, err))?;
        writeln!(file, "{}:  {}", now.format(TIMESTAMP_FORMAT), message)
            .map_err(|err| AuditError::io(&path, err))
    }
}

impl Default for DailyFileLog {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditSink for DailyFileLog {
    fn record(&self, message: &str) {
        mirror(message);
        if let Err(err) = self.try_record(message) {
            log::warn!("[Audit] {}", err);
        }
    }
}
