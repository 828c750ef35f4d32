use std::process::Command;

use serde_json::Value;

fn cli(audit: &tempfile::TempDir) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_wsbridge_cli"));
    command.arg("--audit-dir").arg(audit.path());
    command
}

#[test]
fn invoke_add_prints_sum() {
    let audit = tempfile::tempdir().unwrap();
    let output = cli(&audit)
        .args(["invoke", "--function", "ADD", "--params", "[3, 4]"])
        .output()
        .expect("failed to run wsbridge_cli invoke");
    assert!(
        output.status.success(),
        "CLI exited with {:?}",
        output.status.code()
    );
    let stdout = String::from_utf8(output.stdout).expect("stdout UTF-8");
    assert_eq!(stdout.trim(), "7");
}

#[test]
fn invoke_debug_writes_audit_file() {
    let audit = tempfile::tempdir().unwrap();
    let output = cli(&audit)
        .args(["invoke", "--function", "MATRIX_OP", "--debug"])
        .output()
        .expect("failed to run wsbridge_cli invoke --debug");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).expect("stdout UTF-8");
    let json: Value = serde_json::from_str(stdout.trim()).expect("matrix JSON");
    assert_eq!(json, serde_json::json!([[1, 4], [2, 5], [3, 6]]));

    let logged: String = std::fs::read_dir(audit.path())
        .expect("audit dir")
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| std::fs::read_to_string(entry.path()).ok())
        .collect();
    assert!(logged.contains("MATRIX_OP called"), "audit was {logged}");
}

#[test]
fn invoke_failure_exits_nonzero() {
    let audit = tempfile::tempdir().unwrap();
    let output = cli(&audit)
        .args(["invoke", "--function", "FAIL"])
        .output()
        .expect("failed to run failing invoke");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).expect("stderr UTF-8");
    assert!(stderr.contains("FAIL"), "expected error in stderr, got {stderr}");
}

#[test]
fn invoke_failure_degrades_to_value() {
    let audit = tempfile::tempdir().unwrap();
    let output = cli(&audit)
        .args(["invoke", "--function", "FAIL", "--degrade"])
        .output()
        .expect("failed to run degraded invoke");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("stdout UTF-8");
    let json: Value = serde_json::from_str(stdout.trim()).expect("failure JSON");
    assert_eq!(json[0], 1);
}

#[test]
fn info_reports_identity() {
    let audit = tempfile::tempdir().unwrap();
    let output = cli(&audit)
        .arg("info")
        .output()
        .expect("failed to run info");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("stdout UTF-8");
    let json: Value = serde_json::from_str(stdout.trim()).expect("info JSON");
    assert_eq!(json["sys_dir"], "/opt/workspace");
    assert_eq!(json["engine_version"], "scripted-1");
}

#[test]
fn transpose_matrix() {
    let audit = tempfile::tempdir().unwrap();
    let output = cli(&audit)
        .args(["transpose", "--matrix", "[[1.5, 2.5, 3.5]]"])
        .output()
        .expect("failed to run transpose");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("stdout UTF-8");
    let json: Value = serde_json::from_str(stdout.trim()).expect("matrix JSON");
    assert_eq!(json, serde_json::json!([[1.5], [2.5], [3.5]]));
}

#[test]
fn invoke_debug_respects_configured_engine() {
    let audit = tempfile::tempdir().unwrap();
    let config = audit.path().join("bridge_config.json");
    std::fs::write(&config, r#"{"engine": "missing"}"#).expect("write config");

    let output = cli(&audit)
        .arg("--config")
        .arg(&config)
        .args(["invoke", "--function", "ADD", "--debug"])
        .output()
        .expect("failed to run invoke with config");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).expect("stderr UTF-8");
    assert!(stderr.contains("missing"), "expected engine name in stderr, got {stderr}");
}

#[test]
fn transpose_oversized_shape_is_an_error() {
    let audit = tempfile::tempdir().unwrap();
    let output = cli(&audit)
        .args([
            "transpose",
            "--matrix",
            r#"{"shape":[4294967296,4294967297],"data":[]}"#,
        ])
        .output()
        .expect("failed to run transpose");
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn transpose_string_matrix() {
    let audit = tempfile::tempdir().unwrap();
    let output = cli(&audit)
        .args(["transpose", "--matrix", r#"[["a","b"],["c","d"]]"#])
        .output()
        .expect("failed to run transpose");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("stdout UTF-8");
    let json: Value = serde_json::from_str(stdout.trim()).expect("matrix JSON");
    assert_eq!(json, serde_json::json!([["a", "c"], ["b", "d"]]));
}
