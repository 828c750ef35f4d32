//! The process-wide audit sink resolves its directory from the environment on
//! first use, so this check runs in its own test binary.

use std::fs;

use workspace_bridge::audit::{self, AuditSink, LOG_DIR_ENV};

#[test]
fn test_global_sink_writes_daily_file() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("audit");
    std::env::set_var(LOG_DIR_ENV, &root);

    audit::log("first event");
    audit::global().record("second event");

    let name = format!("log_{}.txt", chrono::Local::now().format("%Y%m%d"));
    let contents = fs::read_to_string(root.join(name)).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with(":  first event"));
    assert!(lines[1].ends_with(":  second event"));
}
