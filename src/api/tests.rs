use super::*;
use crate::audit::MemoryAuditLog;
use crate::engine::ScriptedEngine;
use crate::session::SessionOptions;
use crate::variant::{Array, VariantArray};
use std::sync::Arc;

fn bridge(engine: ScriptedEngine) -> (WorkspaceBridge, Arc<MemoryAuditLog>) {
    let audit = Arc::new(MemoryAuditLog::new());
    let options = SessionOptions::default().with_audit(audit.clone());
    let session = EngineSession::open(move || Ok(Box::new(engine)), options).unwrap();
    (WorkspaceBridge::from_session(session), audit)
}

#[test]
fn test_get_version() {
    let result = get_version().unwrap();
    assert_eq!(result, "0.1.0");
}

#[test]
fn test_error_codes_object() {
    let _codes = get_bridge_error_codes();
    assert_eq!(BridgeErrorCodes::SESSION_CLOSED, 3005);
}

#[test]
fn test_invoke_json_add() {
    let (bridge, _) = bridge(ScriptedEngine::demo());
    let result = bridge
        .invoke_json("ADD".to_string(), Some("[3, 4]".to_string()))
        .unwrap();
    assert_eq!(result, "7");
}

#[test]
fn test_invoke_json_matrix() {
    let (bridge, _) = bridge(ScriptedEngine::demo());
    let result = bridge.invoke_json("MATRIX_OP".to_string(), None).unwrap();
    assert_eq!(result, "[[1,4],[2,5],[3,6]]");
}

#[test]
fn test_invoke_json_rejects_bad_json() {
    let (bridge, _) = bridge(ScriptedEngine::demo());
    let result = bridge.invoke_json("ADD".to_string(), Some("[3,".to_string()));
    assert!(matches!(result, Err(BridgeError::Call { .. })));
}

#[test]
fn test_dispose_twice() {
    let engine = ScriptedEngine::demo();
    let probe = engine.probe();
    let (bridge, _) = bridge(engine);
    assert!(bridge.dispose().is_ok());
    assert!(bridge.dispose().is_ok());
    drop(bridge);
    assert_eq!(probe.close_calls(), 1);
}

#[test]
fn test_transpose_array_helper() {
    let matrix = Variant::Array(VariantArray::Bool(
        Array::from_rows(vec![vec![true, false]]).unwrap(),
    ));
    let expected = Variant::Array(VariantArray::Bool(
        Array::from_rows(vec![vec![true], vec![false]]).unwrap(),
    ));
    assert_eq!(transpose_array(matrix), expected);
    assert_eq!(transpose_array(Variant::Int(1)), Variant::Int(1));
}

#[test]
fn test_failure_policy_getter() {
    let (bridge, _) = bridge(ScriptedEngine::demo());
    assert_eq!(bridge.failure_policy().unwrap(), FailurePolicy::Propagate);
}
