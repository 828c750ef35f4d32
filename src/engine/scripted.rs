use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::WorkspaceEngine;
use crate::error::BridgeError;
use crate::variant::{Array, Variant, VariantArray};

/// Body of a scripted workspace function: receives the parameter bundle.
pub type ScriptedFunction = Box<dyn Fn(&Variant) -> Result<Variant, BridgeError> + Send>;

const DEFAULT_DISPATCH_FUNCTION: &str = "API_Call";

/// In-process workspace engine driven by registered closures.
///
/// Used by the command-line harness, by host smoke tests and by the test
/// suite. It mimics the real engine's trampoline: `call(dispatch, [params,
/// name])` resolves `name` among the registered functions
/// (case-insensitively) and runs it with `params`.
pub struct ScriptedEngine {
    dispatch_function: String,
    functions: HashMap<String, ScriptedFunction>,
    settings: HashMap<String, Variant>,
    expressions: HashMap<String, Variant>,
    call_values: HashMap<String, Variant>,
    sys_values: HashMap<String, Variant>,
    variables: HashMap<String, String>,
    visibility_supported: bool,
    close_failure: Option<BridgeError>,
    shutdown_failure: Option<BridgeError>,
    closed: bool,
    probe: EngineProbe,
}

/// Shared view of what the engine observed, kept after the engine is boxed.
#[derive(Clone, Default)]
pub struct EngineProbe {
    inner: Arc<ProbeState>,
}

#[derive(Default)]
struct ProbeState {
    close_calls: AtomicUsize,
    shutdown_signals: AtomicUsize,
    visible: AtomicBool,
    dispatched: Mutex<Vec<(String, Variant)>>,
}

impl EngineProbe {
    pub fn close_calls(&self) -> usize {
        self.inner.close_calls.load(Ordering::SeqCst)
    }

    pub fn shutdown_signals(&self) -> usize {
        self.inner.shutdown_signals.load(Ordering::SeqCst)
    }

    pub fn is_visible(&self) -> bool {
        self.inner.visible.load(Ordering::SeqCst)
    }

    /// `(function name, parameters)` for every trampoline call, in order.
    pub fn dispatched(&self) -> Vec<(String, Variant)> {
        self.inner
            .dispatched
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

impl ScriptedEngine {
    /// Empty engine: no functions, settings or identity values.
    pub fn new() -> Self {
        Self {
            dispatch_function: DEFAULT_DISPATCH_FUNCTION.to_string(),
            functions: HashMap::new(),
            settings: HashMap::new(),
            expressions: HashMap::new(),
            call_values: HashMap::new(),
            sys_values: HashMap::new(),
            variables: HashMap::new(),
            visibility_supported: false,
            close_failure: None,
            shutdown_failure: None,
            closed: false,
            probe: EngineProbe::default(),
        }
    }

    /// Engine preloaded with demo functions and identity values.
    ///
    /// Functions: `ADD` (sums an integer list), `MATRIX_OP` (2×3 integer
    /// matrix), `TABLE` (status code, 2×2 double matrix, label), `ECHO`,
    /// `NOTHING` (no value) and `FAIL` (raises).
    pub fn demo() -> Self {
        Self::new()
            .with_function("ADD", add_integers)
            .with_function("MATRIX_OP", |_| {
                Ok(Variant::Array(VariantArray::Int(Array::from_rows(vec![
                    vec![1, 2, 3],
                    vec![4, 5, 6],
                ])?)))
            })
            .with_function("TABLE", |_| {
                Ok(Variant::Sequence(vec![
                    Variant::Int(0),
                    Variant::Array(VariantArray::Double(Array::from_rows(vec![
                        vec![0.5, 1.5],
                        vec![2.5, 3.5],
                    ])?)),
                    Variant::from("table"),
                ]))
            })
            .with_function("ECHO", |params| Ok(params.clone()))
            .with_function("NOTHING", |_| Ok(Variant::Empty))
            .with_function("FAIL", |_| {
                Err(BridgeError::Call {
                    function: "FAIL".to_string(),
                    reason: "DOMAIN ERROR".to_string(),
                })
            })
            .with_call_value("SYSDIR", Variant::from("/opt/workspace"))
            .with_expression("PROVER", Variant::from("1.0.0"))
            .with_sys_value("SYSVER", Variant::from("scripted-1"))
            .with_variable("USERDIR", "/home/workspace")
            .with_variable("LIBDIR", "default")
    }

    pub fn with_dispatch_function(mut self, name: &str) -> Self {
        self.dispatch_function = name.to_string();
        self
    }

    pub fn with_function<F>(mut self, name: &str, body: F) -> Self
    where
        F: Fn(&Variant) -> Result<Variant, BridgeError> + Send + 'static,
    {
        self.functions.insert(name.to_uppercase(), Box::new(body));
        self
    }

    /// Value answered by `INIGET '<key>'`.
    pub fn with_setting(mut self, key: &str, value: Variant) -> Self {
        self.settings.insert(key.to_string(), value);
        self
    }

    pub fn with_expression(mut self, expression: &str, value: Variant) -> Self {
        self.expressions.insert(expression.to_string(), value);
        self
    }

    pub fn with_call_value(mut self, name: &str, value: Variant) -> Self {
        self.call_values.insert(name.to_string(), value);
        self
    }

    pub fn with_sys_value(mut self, name: &str, value: Variant) -> Self {
        self.sys_values.insert(name.to_string(), value);
        self
    }

    pub fn with_variable(mut self, name: &str, value: &str) -> Self {
        self.variables.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_visibility_support(mut self) -> Self {
        self.visibility_supported = true;
        self
    }

    /// Make `close()` fail once with `err`.
    pub fn fail_close_with(mut self, err: BridgeError) -> Self {
        self.close_failure = Some(err);
        self
    }

    /// Make the `SHUTDOWN` dispatch fail once with `err`.
    pub fn fail_shutdown_with(mut self, err: BridgeError) -> Self {
        self.shutdown_failure = Some(err);
        self
    }

    pub fn probe(&self) -> EngineProbe {
        self.probe.clone()
    }

    fn ensure_open(&self) -> Result<(), BridgeError> {
        if self.closed {
            return Err(BridgeError::Transport {
                reason: "workspace engine has been closed".to_string(),
            });
        }
        Ok(())
    }

    fn dispatch(&mut self, args: &[Variant]) -> Result<Variant, BridgeError> {
        let (params, target) = match args {
            [params, Variant::Str(target)] => (params, target.as_str()),
            _ => {
                return Err(BridgeError::Call {
                    function: self.dispatch_function.clone(),
                    reason: "expected (parameters, function name)".to_string(),
                })
            }
        };

        if let Ok(mut calls) = self.probe.inner.dispatched.lock() {
            calls.push((target.to_string(), params.clone()));
        }

        let key = target.to_uppercase();
        if key == "SHUTDOWN" {
            self.probe.inner.shutdown_signals.fetch_add(1, Ordering::SeqCst);
            return match self.shutdown_failure.take() {
                Some(err) => Err(err),
                None => Ok(Variant::Empty),
            };
        }

        match self.functions.get(&key) {
            Some(body) => body(params),
            None => Err(BridgeError::Call {
                function: target.to_string(),
                reason: "VALUE ERROR: function is not defined".to_string(),
            }),
        }
    }
}

impl Default for ScriptedEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkspaceEngine for ScriptedEngine {
    fn exec(&mut self, expression: &str) -> Result<Variant, BridgeError> {
        self.ensure_open()?;
        if let Some(value) = self.expressions.get(expression) {
            return Ok(value.clone());
        }
        if let Some(key) = parse_iniget(expression) {
            return Ok(self
                .settings
                .get(key)
                .cloned()
                .unwrap_or_else(|| Variant::from("")));
        }
        if let Some(sum) = parse_addition(expression) {
            return Ok(Variant::Int(sum));
        }
        Err(BridgeError::Call {
            function: expression.to_string(),
            reason: "SYNTAX ERROR".to_string(),
        })
    }

    fn call(&mut self, name: &str, args: &[Variant]) -> Result<Variant, BridgeError> {
        self.ensure_open()?;
        if name.eq_ignore_ascii_case(&self.dispatch_function) {
            return self.dispatch(args);
        }
        self.call_values
            .get(name)
            .cloned()
            .ok_or_else(|| BridgeError::Call {
                function: name.to_string(),
                reason: "VALUE ERROR: function is not defined".to_string(),
            })
    }

    fn sys_call(&mut self, name: &str) -> Result<Variant, BridgeError> {
        self.ensure_open()?;
        self.sys_values
            .get(name)
            .cloned()
            .ok_or_else(|| BridgeError::Call {
                function: name.to_string(),
                reason: "unknown system function".to_string(),
            })
    }

    fn variable(&mut self, name: &str) -> Result<String, BridgeError> {
        self.ensure_open()?;
        Ok(self.variables.get(name).cloned().unwrap_or_default())
    }

    fn supports_visibility(&self) -> bool {
        self.visibility_supported
    }

    fn set_visible(&mut self, visible: bool) -> Result<(), BridgeError> {
        self.ensure_open()?;
        if !self.visibility_supported {
            return Err(BridgeError::Call {
                function: "Visible".to_string(),
                reason: "this engine build has no interactive window".to_string(),
            });
        }
        self.probe.inner.visible.store(visible, Ordering::SeqCst);
        Ok(())
    }

    fn close(&mut self) -> Result<(), BridgeError> {
        self.ensure_open()?;
        self.closed = true;
        self.probe.inner.close_calls.fetch_add(1, Ordering::SeqCst);
        match self.close_failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn add_integers(params: &Variant) -> Result<Variant, BridgeError> {
    let domain_error = || BridgeError::Call {
        function: "ADD".to_string(),
        reason: "DOMAIN ERROR: expected a list of integers".to_string(),
    };
    match params {
        Variant::Sequence(items) => items
            .iter()
            .try_fold(0i32, |acc, item| {
                item.as_int().and_then(|value| acc.checked_add(value))
            })
            .map(Variant::Int)
            .ok_or_else(domain_error),
        Variant::Int(value) => Ok(Variant::Int(*value)),
        _ => Err(domain_error()),
    }
}

/// `INIGET '[API] DEBUG'` → `[API] DEBUG`
fn parse_iniget(expression: &str) -> Option<&str> {
    expression
        .trim()
        .strip_prefix("INIGET")?
        .trim()
        .strip_prefix('\'')?
        .strip_suffix('\'')
}

/// `3 + 4` → 7
fn parse_addition(expression: &str) -> Option<i32> {
    let (lhs, rhs) = expression.split_once('+')?;
    let lhs: i32 = lhs.trim().parse().ok()?;
    let rhs: i32 = rhs.trim().parse().ok()?;
    lhs.checked_add(rhs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trampoline(engine: &mut ScriptedEngine, name: &str, params: Variant) -> Result<Variant, BridgeError> {
        engine.call("API_Call", &[params, Variant::from(name)])
    }

    #[test]
    fn test_trampoline_resolves_case_insensitively() {
        let mut engine = ScriptedEngine::demo();
        let params = Variant::Sequence(vec![Variant::Int(3), Variant::Int(4)]);
        assert_eq!(trampoline(&mut engine, "add", params).unwrap(), Variant::Int(7));
    }

    #[test]
    fn test_unknown_function_is_call_error() {
        let mut engine = ScriptedEngine::demo();
        let result = trampoline(&mut engine, "MISSING", Variant::from(""));
        assert!(matches!(result, Err(BridgeError::Call { .. })));
    }

    #[test]
    fn test_iniget_reads_settings() {
        let mut engine = ScriptedEngine::new().with_setting("[API] DEBUG", Variant::Int(1));
        assert_eq!(engine.exec("INIGET '[API] DEBUG'").unwrap(), Variant::Int(1));
        assert_eq!(engine.exec("INIGET '[API] VISIBLE'").unwrap(), Variant::from(""));
    }

    #[test]
    fn test_exec_addition() {
        let mut engine = ScriptedEngine::new();
        assert_eq!(engine.exec("3 + 4").unwrap(), Variant::Int(7));
        assert!(engine.exec("3 +").is_err());
    }

    #[test]
    fn test_closed_engine_reports_transport() {
        let mut engine = ScriptedEngine::demo();
        let probe = engine.probe();
        engine.close().unwrap();
        assert_eq!(probe.close_calls(), 1);
        assert!(engine.exec("PROVER").unwrap_err().is_transport());
        assert!(engine.close().unwrap_err().is_transport());
        assert_eq!(probe.close_calls(), 1);
    }

    #[test]
    fn test_shutdown_is_counted() {
        let mut engine = ScriptedEngine::demo();
        let probe = engine.probe();
        assert_eq!(
            trampoline(&mut engine, "SHUTDOWN", Variant::from("")).unwrap(),
            Variant::Empty
        );
        assert_eq!(probe.shutdown_signals(), 1);
        assert_eq!(probe.dispatched()[0].0, "SHUTDOWN");
    }

    #[test]
    fn test_visibility_requires_support() {
        let mut plain = ScriptedEngine::new();
        assert!(plain.set_visible(true).is_err());

        let mut windowed = ScriptedEngine::new().with_visibility_support();
        let probe = windowed.probe();
        windowed.set_visible(true).unwrap();
        assert!(probe.is_visible());
    }

    #[test]
    fn test_add_rejects_non_integers() {
        let params = Variant::Sequence(vec![Variant::Int(1), Variant::from("x")]);
        assert!(add_integers(&params).is_err());
        let overflow = Variant::Sequence(vec![Variant::Int(i32::MAX), Variant::Int(1)]);
        assert!(add_integers(&overflow).is_err());
    }
}
