//! Named engine factories.
//!
//! Hosts register the constructor for their native engine binding once; the
//! bridge opens sessions by the name given in configuration. Only
//! constructors live here, never engine instances.

use std::collections::HashMap;
use std::sync::RwLock;

use once_cell::sync::Lazy;

use super::{ScriptedEngine, WorkspaceEngine};
use crate::error::BridgeError;

/// Constructor for one engine instance.
pub type EngineFactory = fn() -> Result<Box<dyn WorkspaceEngine>, BridgeError>;

/// Name of the built-in in-process engine
pub const SCRIPTED_ENGINE: &str = "scripted";

static FACTORIES: Lazy<RwLock<HashMap<String, EngineFactory>>> = Lazy::new(|| {
    let mut factories: HashMap<String, EngineFactory> = HashMap::new();
    factories.insert(SCRIPTED_ENGINE.to_string(), scripted_factory);
    RwLock::new(factories)
});

fn scripted_factory() -> Result<Box<dyn WorkspaceEngine>, BridgeError> {
    Ok(Box::new(ScriptedEngine::demo()))
}

fn poisoned() -> BridgeError {
    BridgeError::LockPoisoned {
        component: "engine_registry".to_string(),
    }
}

/// Register (or replace) the factory for `name`.
pub fn register_factory(name: &str, factory: EngineFactory) -> Result<(), BridgeError> {
    let mut factories = FACTORIES.write().map_err(|_| poisoned())?;
    if factories.insert(name.to_string(), factory).is_some() {
        log::info!("[Engine] Replaced factory {}", name);
    }
    Ok(())
}

/// Look up the factory registered for `name`.
pub fn factory(name: &str) -> Result<EngineFactory, BridgeError> {
    let factories = FACTORIES.read().map_err(|_| poisoned())?;
    factories
        .get(name)
        .copied()
        .ok_or_else(|| BridgeError::EngineInit {
            reason: format!("no engine factory registered under '{}'", name),
        })
}

/// Create a fresh engine instance from the factory registered for `name`.
pub fn create(name: &str) -> Result<Box<dyn WorkspaceEngine>, BridgeError> {
    factory(name)?()
}
