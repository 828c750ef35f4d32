//! Engine boundary.
//!
//! The workspace engine is an external collaborator that owns its own
//! execution semantics. This module defines the trait the bridge drives it
//! through (`WorkspaceEngine`), a registry of named factories used to open
//! sessions from configuration, and an in-process scripted engine.

mod registry;
mod scripted;

pub use registry::{create, factory, register_factory, EngineFactory, SCRIPTED_ENGINE};
pub use scripted::{EngineProbe, ScriptedEngine, ScriptedFunction};

use crate::error::BridgeError;
use crate::variant::Variant;

/// Operations the bridge needs from a workspace engine instance.
///
/// Implementations are not required to be reentrant: the session serializes
/// every call through `&mut self`. Errors that mean "the channel to the
/// engine is gone" must be reported as [`BridgeError::Transport`] so the
/// session can tell expected shutdown noise from real failures.
pub trait WorkspaceEngine: Send {
    /// Evaluate an expression in the workspace.
    fn exec(&mut self, expression: &str) -> Result<Variant, BridgeError>;

    /// Call a named workspace function with positional arguments.
    fn call(&mut self, name: &str, args: &[Variant]) -> Result<Variant, BridgeError>;

    /// Query a system function.
    fn sys_call(&mut self, name: &str) -> Result<Variant, BridgeError>;

    /// Read a workspace variable as text.
    fn variable(&mut self, name: &str) -> Result<String, BridgeError>;

    /// Whether this engine build has an interactive window to show.
    fn supports_visibility(&self) -> bool {
        false
    }

    fn set_visible(&mut self, visible: bool) -> Result<(), BridgeError>;

    /// Release the engine instance.
    fn close(&mut self) -> Result<(), BridgeError>;
}
