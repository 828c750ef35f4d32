// EngineSession: owns one workspace engine instance
//
// Construction creates the engine and resolves the debug/visibility flags
// from the engine's configuration store. Teardown signals SHUTDOWN, releases
// the engine exactly once, and runs from either an explicit call or Drop.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::audit::{self, AuditSink, DailyFileLog};
use crate::config::BridgeConfig;
use crate::engine::WorkspaceEngine;
use crate::error::{log_bridge_error, BridgeError};
use crate::gateway::{DispatchGateway, FailurePolicy};
use crate::variant::Variant;

const DEBUG_KEY: &str = "[API] DEBUG";
const VISIBLE_KEY: &str = "[API] VISIBLE";

/// What happens when the engine cannot be created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstructionPolicy {
    /// Return the `EngineInit` error to the caller
    #[default]
    Strict,
    /// Log the failure and hand back a session without an engine; every
    /// operation on it fails with `SessionClosed`
    Lenient,
}

/// Settings a session is opened with
#[derive(Clone)]
pub struct SessionOptions {
    pub failure_policy: FailurePolicy,
    pub construction_policy: ConstructionPolicy,
    pub dispatch_function: String,
    pub audit: Arc<dyn AuditSink>,
    /// Debug mode on whatever the engine's `[API] DEBUG` setting says
    pub force_debug: bool,
}

impl SessionOptions {
    /// # Errors
    /// `BridgeError::Config` when the engine name or the dispatch function
    /// is blank.
    pub fn from_config(config: &BridgeConfig) -> Result<Self, BridgeError> {
        if config.engine.trim().is_empty() {
            return Err(BridgeError::Config {
                reason: "engine name is empty".to_string(),
            });
        }
        if config.dispatch_function.trim().is_empty() {
            return Err(BridgeError::Config {
                reason: "dispatch_function is empty".to_string(),
            });
        }

        let audit: Arc<dyn AuditSink> = match &config.audit_dir {
            Some(dir) => Arc::new(DailyFileLog::at(dir)),
            None => audit::global(),
        };
        Ok(Self {
            failure_policy: config.failure_policy,
            construction_policy: config.construction_policy,
            dispatch_function: config.dispatch_function.clone(),
            audit,
            force_debug: false,
        })
    }

    pub fn with_audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_construction_policy(mut self, policy: ConstructionPolicy) -> Self {
        self.construction_policy = policy;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.force_debug = debug;
        self
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        let config = BridgeConfig::default();
        Self {
            failure_policy: config.failure_policy,
            construction_policy: config.construction_policy,
            dispatch_function: config.dispatch_function,
            audit: audit::global(),
            force_debug: false,
        }
    }
}

/// One live workspace engine plus the gateway that dispatches into it.
///
/// Not internally synchronized: the engine is non-reentrant and every
/// operation takes `&mut self`. Share it across threads behind a mutex.
pub struct EngineSession {
    engine: Option<Box<dyn WorkspaceEngine>>,
    gateway: DispatchGateway,
    audit: Arc<dyn AuditSink>,
    debug: bool,
    visible: bool,
    shutting_down: bool,
}

impl EngineSession {
    /// Create the engine through `factory` and resolve the session flags.
    ///
    /// # Errors
    /// `BridgeError::EngineInit` when the factory fails and the construction
    /// policy is `Strict`. Flag lookups never fail construction.
    pub fn open<F>(factory: F, options: SessionOptions) -> Result<Self, BridgeError>
    where
        F: FnOnce() -> Result<Box<dyn WorkspaceEngine>, BridgeError>,
    {
        let SessionOptions {
            failure_policy,
            construction_policy,
            dispatch_function,
            audit,
            force_debug,
        } = options;

        let mut engine = match factory() {
            Ok(engine) => engine,
            Err(err) => {
                let err = match err {
                    BridgeError::EngineInit { .. } => err,
                    other => BridgeError::EngineInit {
                        reason: other.to_string(),
                    },
                };
                audit.record(&format!("Error: {}", err));
                log_bridge_error(&err, "open_session");
                return match construction_policy {
                    ConstructionPolicy::Strict => Err(err),
                    ConstructionPolicy::Lenient => Ok(Self {
                        engine: None,
                        gateway: DispatchGateway::new(
                            failure_policy,
                            &dispatch_function,
                            false,
                            audit.clone(),
                        ),
                        audit,
                        debug: false,
                        visible: false,
                        shutting_down: false,
                    }),
                };
            }
        };

        let debug = force_debug || query_flag(engine.as_mut(), DEBUG_KEY);
        let gateway = DispatchGateway::new(failure_policy, &dispatch_function, debug, audit.clone());
        let mut session = Self {
            engine: Some(engine),
            gateway,
            audit,
            debug,
            visible: false,
            shutting_down: false,
        };

        if debug {
            session.audit.record("Debug=1");
            session.audit.record("Created instance of the workspace engine ...");
            session.log_identity();
            session.apply_visibility();
        }
        log::info!("[Session] Workspace engine ready (debug={})", debug);

        Ok(session)
    }

    /// Open the engine named in `config` through the factory registry.
    pub fn from_config(config: &BridgeConfig) -> Result<Self, BridgeError> {
        Self::open(
            || crate::engine::create(&config.engine),
            SessionOptions::from_config(config)?,
        )
    }

    pub fn is_open(&self) -> bool {
        self.engine.is_some()
    }

    pub fn debug_enabled(&self) -> bool {
        self.debug
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.gateway.policy()
    }

    fn engine_mut(&mut self) -> Result<&mut Box<dyn WorkspaceEngine>, BridgeError> {
        self.engine.as_mut().ok_or(BridgeError::SessionClosed)
    }

    pub fn sys_dir(&mut self) -> Result<String, BridgeError> {
        Ok(self.engine_mut()?.call("SYSDIR", &[])?.into_text())
    }

    pub fn user_dir(&mut self) -> Result<String, BridgeError> {
        self.engine_mut()?.variable("USERDIR")
    }

    pub fn product_version(&mut self) -> Result<String, BridgeError> {
        Ok(self.engine_mut()?.exec("PROVER")?.into_text())
    }

    pub fn engine_version(&mut self) -> Result<String, BridgeError> {
        Ok(self.engine_mut()?.sys_call("SYSVER")?.into_text())
    }

    pub fn current_client(&mut self) -> Result<String, BridgeError> {
        self.engine_mut()?.variable("LIBDIR")
    }

    /// Integer addition evaluated by the engine; a connectivity smoke test.
    pub fn add(&mut self, x: i32, y: i32) -> Result<i32, BridgeError> {
        match self.engine_mut()?.exec(&format!("{} + {}", x, y))? {
            Variant::Int(sum) => Ok(sum),
            other => Err(BridgeError::Call {
                function: "ADD".to_string(),
                reason: format!("expected an integer result, got {:?}", other),
            }),
        }
    }

    /// Call a workspace function by name through the dispatch gateway.
    pub fn invoke(
        &mut self,
        function_name: &str,
        parameters: Option<Variant>,
    ) -> Result<Variant, BridgeError> {
        match self.engine.as_mut() {
            Some(engine) => self.gateway.invoke(
                engine.as_mut(),
                function_name,
                parameters,
                self.shutting_down,
            ),
            None => self
                .gateway
                .fail(function_name, BridgeError::SessionClosed, self.shutting_down),
        }
    }

    /// Shut the engine down and release it.
    ///
    /// Only the first call does anything; later calls return `Ok(())`.
    /// Transport failures during shutdown are expected and swallowed (audited
    /// in debug mode). Any other failure is audited and returned, with a
    /// failure to close taking precedence over a failure to signal.
    pub fn teardown(&mut self) -> Result<(), BridgeError> {
        let Some(mut engine) = self.engine.take() else {
            return Ok(());
        };

        self.shutting_down = true;
        if self.debug {
            self.audit.record("Closing the workspace engine.");
        }

        if engine.supports_visibility() {
            if let Err(err) = engine.set_visible(false) {
                let _ = self.screen_shutdown_error(err);
            }
        }

        let signalled = self
            .gateway
            .invoke(engine.as_mut(), "SHUTDOWN", None, true);
        let released = engine.close();
        drop(engine);
        self.shutting_down = false;
        self.visible = false;

        let signal_err = signalled.err().and_then(|err| self.screen_shutdown_error(err));
        let close_err = released.err().and_then(|err| self.screen_shutdown_error(err));
        match close_err.or(signal_err) {
            Some(err) => Err(err),
            None => {
                log::info!("[Session] Workspace engine released");
                Ok(())
            }
        }
    }

    /// `None` for expected shutdown noise, `Some` for failures the caller must see.
    fn screen_shutdown_error(&self, err: BridgeError) -> Option<BridgeError> {
        if err.is_transport() {
            if self.debug {
                self.audit.record(&format!("Error: {}", err));
            }
            return None;
        }
        self.audit.record(&format!("Error: {}", err));
        log_bridge_error(&err, "teardown");
        Some(err)
    }

    fn log_identity(&mut self) {
        let lines = [
            ("Workspace system directory", self.sys_dir()),
            ("Working/User directory", self.user_dir()),
            ("Product version", self.product_version()),
        ];
        for (label, value) in lines {
            match value {
                Ok(value) => self.audit.record(&format!("{}: {}", label, value)),
                Err(err) => self.audit.record(&format!("{}: unavailable ({})", label, err)),
            }
        }
    }

    fn apply_visibility(&mut self) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        if !query_flag(engine.as_mut(), VISIBLE_KEY) {
            return;
        }
        self.audit.record("Visible=1");
        if !engine.supports_visibility() {
            log::info!("[Session] Engine build has no interactive window; ignoring Visible=1");
            return;
        }
        match engine.set_visible(true) {
            Ok(()) => self.visible = true,
            Err(err) => self.audit.record(&format!("Error: {}", err)),
        }
    }
}

impl Drop for EngineSession {
    fn drop(&mut self) {
        if let Err(err) = self.teardown() {
            log::warn!("[Session] Teardown on drop failed: {}", err);
        }
    }
}

/// `true` only when `INIGET '<key>'` answers the integer 1.
fn query_flag(engine: &mut dyn WorkspaceEngine, key: &str) -> bool {
    match engine.exec(&format!("INIGET '{}'", key)) {
        Ok(Variant::Int(1)) => true,
        Ok(_) => false,
        Err(err) => {
            log::warn!("[Session] Could not read {}: {}", key, err);
            false
        }
    }
}
