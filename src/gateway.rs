// DispatchGateway: the single call surface into the workspace engine
//
// Every request goes through one engine function (the dispatch function) that
// resolves the target by name, so no native binding is needed per workspace
// function. Results are re-oriented before they reach the caller and failures
// follow one policy for the lifetime of the gateway.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::audit::AuditSink;
use crate::engine::WorkspaceEngine;
use crate::error::{BridgeError, ErrorCode};
use crate::variant::{transpose, Variant};

/// Function whose empty result is expected rather than suspicious
const SHUTDOWN_FUNCTION: &str = "SHUTDOWN";

/// Status code of a degraded failure result `[1, message]`
pub const FAILURE_STATUS: i32 = 1;

/// How dispatch failures reach the caller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Return the typed error
    #[default]
    Propagate,
    /// Return `[1, <message>]` as a normal value
    DegradeToValue,
}

pub struct DispatchGateway {
    policy: FailurePolicy,
    debug: bool,
    dispatch_function: String,
    audit: Arc<dyn AuditSink>,
}

impl DispatchGateway {
    pub fn new(
        policy: FailurePolicy,
        dispatch_function: &str,
        debug: bool,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            policy,
            debug,
            dispatch_function: dispatch_function.to_string(),
            audit,
        }
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Call `function_name` in the engine with `parameters`.
    ///
    /// Missing or empty parameters are sent as an empty string. Rank-2 arrays
    /// in the result (top level or sequence elements) come back transposed.
    /// `shutting_down` silences transport failures under
    /// [`FailurePolicy::DegradeToValue`].
    pub fn invoke(
        &self,
        engine: &mut dyn WorkspaceEngine,
        function_name: &str,
        parameters: Option<Variant>,
        shutting_down: bool,
    ) -> Result<Variant, BridgeError> {
        let _span = tracing::debug_span!("invoke", function = function_name).entered();

        let parameters = match parameters {
            None | Some(Variant::Empty) => Variant::from(""),
            Some(value) => value,
        };

        if self.debug {
            self.audit.record(&format!("{} called", function_name));
        }

        let args = [parameters, Variant::from(function_name)];
        match engine.call(&self.dispatch_function, &args) {
            Ok(result) => Ok(self.post_process(function_name, result)),
            Err(err) => self.fail(function_name, classify(function_name, err), shutting_down),
        }
    }

    /// Apply the failure policy to an error raised on behalf of `function_name`.
    pub fn fail(
        &self,
        function_name: &str,
        err: BridgeError,
        shutting_down: bool,
    ) -> Result<Variant, BridgeError> {
        match self.policy {
            FailurePolicy::Propagate => {
                // Shutdown transport noise is audited once, by the session.
                if self.debug && !(shutting_down && err.is_transport()) {
                    self.audit.record(&format!("ERROR:  {}", err));
                }
                Err(err)
            }
            FailurePolicy::DegradeToValue => {
                let message = if err.is_transport() {
                    format!(
                        "Engine connection failed while calling {}: {}",
                        function_name,
                        err.message()
                    )
                } else {
                    err.message()
                };
                if !(shutting_down && err.is_transport()) {
                    self.audit.record(&format!("ERROR:  {}", message));
                }
                Ok(Variant::Sequence(vec![
                    Variant::Int(FAILURE_STATUS),
                    Variant::Str(message),
                ]))
            }
        }
    }

    fn post_process(&self, function_name: &str, result: Variant) -> Variant {
        match result {
            Variant::Empty => {
                if self.debug && !function_name.eq_ignore_ascii_case(SHUTDOWN_FUNCTION) {
                    self.audit.record(&format!(
                        "WARNING: The function {} returned no value.",
                        function_name
                    ));
                }
                Variant::Empty
            }
            Variant::Sequence(items) => {
                Variant::Sequence(items.into_iter().map(reorient).collect())
            }
            other => reorient(other),
        }
    }
}

fn reorient(value: Variant) -> Variant {
    match value {
        Variant::Array(ref array) if array.rank() == 2 => Variant::Array(transpose(array)),
        other => other,
    }
}

/// Transport failures keep their kind; everything else is reported against
/// the function the caller asked for.
fn classify(function_name: &str, err: BridgeError) -> BridgeError {
    let keep = match &err {
        BridgeError::Transport { .. } => true,
        BridgeError::Call { function, .. } => function.eq_ignore_ascii_case(function_name),
        _ => false,
    };
    if keep {
        err
    } else {
        BridgeError::Call {
            function: function_name.to_string(),
            reason: err.message(),
        }
    }
}
