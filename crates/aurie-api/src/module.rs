//! Module identity, lifecycle operations and callbacks

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Opaque handle identifying a module loaded into the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleId(u64);

impl ModuleId {
    /// Wrap a raw id
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw id value
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "module#{}", self.0)
    }
}

/// Lifecycle operation a module goes through
///
/// The loader names the operation explicitly when it dispatches callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleOperation {
    /// Early setup, before the host is fully up
    Preinitialize,

    /// Regular initialization
    Initialize,

    /// Teardown
    Unload,
}

impl fmt::Display for ModuleOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleOperation::Preinitialize => write!(f, "preinitialize"),
            ModuleOperation::Initialize => write!(f, "initialize"),
            ModuleOperation::Unload => write!(f, "unload"),
        }
    }
}

/// Notification delivered to module callbacks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleEvent {
    /// Module undergoing the operation
    pub module: ModuleId,

    /// Display name of that module
    pub module_name: String,

    /// Operation being performed
    pub operation: ModuleOperation,

    /// True when the operation is about to run, false once it has run
    pub is_future_call: bool,
}

impl ModuleEvent {
    /// Create a new event
    pub fn new(
        module: ModuleId,
        module_name: impl Into<String>,
        operation: ModuleOperation,
        is_future_call: bool,
    ) -> Self {
        Self {
            module,
            module_name: module_name.into(),
            operation,
            is_future_call,
        }
    }

    /// True if this notification was sent after the operation took effect
    pub fn is_completed(&self) -> bool {
        !self.is_future_call
    }
}

/// Lifecycle callback a module registers to observe every module's transitions
pub type ModuleCallback = Arc<dyn Fn(&ModuleEvent) + Send + Sync>;

/// Module lifecycle state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleState {
    /// Module is mapped but no entry point has run
    Loaded,

    /// Preinitialize entry point completed
    Preinitialized,

    /// Initialize entry point completed
    Initialized,

    /// Unload is in progress
    Unloading,

    /// An entry point failed
    Failed(String),
}

impl ModuleState {
    /// State reached once `operation` completes successfully
    pub fn after(operation: ModuleOperation) -> Self {
        match operation {
            ModuleOperation::Preinitialize => ModuleState::Preinitialized,
            ModuleOperation::Initialize => ModuleState::Initialized,
            ModuleOperation::Unload => ModuleState::Unloading,
        }
    }

    /// Check if the module is initialized
    pub fn is_initialized(&self) -> bool {
        matches!(self, ModuleState::Initialized)
    }

    /// Check if the module has failed
    pub fn is_failed(&self) -> bool {
        matches!(self, ModuleState::Failed(_))
    }
}

impl fmt::Display for ModuleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleState::Loaded => write!(f, "loaded"),
            ModuleState::Preinitialized => write!(f, "preinitialized"),
            ModuleState::Initialized => write!(f, "initialized"),
            ModuleState::Unloading => write!(f, "unloading"),
            ModuleState::Failed(msg) => write!(f, "failed: {}", msg),
        }
    }
}
