//! Module manager for loader-facing lifecycle operations

use crate::config::ObjectManagerConfig;
use crate::error::{ObjectError, Result};
use crate::registry::{ModuleInfo, ObjectManager};
use aurie_api::{ModuleId, ModuleOperation, ModuleState};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Drives modules through their lifecycle operations
///
/// Wraps an [`ObjectManager`] and brackets every entry point with the
/// before/after callback notifications the loader owes the other modules.
#[derive(Clone, Debug, Default)]
pub struct ModuleManager {
    objects: ObjectManager,
}

impl ModuleManager {
    /// Create a new module manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a module manager with the given configuration
    pub fn with_config(config: ObjectManagerConfig) -> Self {
        Self {
            objects: ObjectManager::with_config(config),
        }
    }

    /// Create a module manager over an existing object manager
    pub fn with_object_manager(objects: ObjectManager) -> Self {
        Self { objects }
    }

    /// Get the underlying object manager
    pub fn objects(&self) -> &ObjectManager {
        &self.objects
    }

    /// Register a freshly mapped module
    pub fn load(&self, name: impl Into<String>, image_path: Option<PathBuf>) -> ModuleId {
        match image_path {
            Some(path) => self.objects.register_module_with_path(name, path),
            None => self.objects.register_module(name),
        }
    }

    /// Run a preinitialize or initialize entry point
    ///
    /// Every callback is told the operation is about to happen, `entry`
    /// runs, the module's state advances, and every callback is told the
    /// operation happened. If `entry` fails the module is marked failed, the
    /// completion notification is skipped, and the error is returned.
    pub fn run_operation<F>(&self, module: ModuleId, operation: ModuleOperation, entry: F) -> Result<()>
    where
        F: FnOnce(&ObjectManager, ModuleId) -> Result<()>,
    {
        if operation == ModuleOperation::Unload {
            return self.unload(module, entry).map(|_| ());
        }

        let info = self
            .objects
            .module(module)
            .ok_or(ObjectError::ModuleNotFound(module))?;
        Self::check_transition(&info, operation)?;

        self.objects.dispatch(module, operation, true)?;

        if let Err(e) = entry(&self.objects, module) {
            error!(module = %module, operation = %operation, error = %e, "Module entry point failed");
            self.objects
                .set_module_state(module, ModuleState::Failed(e.to_string()))?;
            return Err(e);
        }

        self.objects
            .set_module_state(module, ModuleState::after(operation))?;
        self.objects.dispatch(module, operation, false)?;

        info!(module = %module, name = %info.name, operation = %operation, "Module operation completed");
        Ok(())
    }

    /// Run preinitialize then initialize
    pub fn initialize<P, I>(&self, module: ModuleId, preinitialize: P, initialize: I) -> Result<()>
    where
        P: FnOnce(&ObjectManager, ModuleId) -> Result<()>,
        I: FnOnce(&ObjectManager, ModuleId) -> Result<()>,
    {
        self.run_operation(module, ModuleOperation::Preinitialize, preinitialize)?;
        self.run_operation(module, ModuleOperation::Initialize, initialize)
    }

    /// Unload a module
    ///
    /// Callbacks are told the unload is about to happen, `entry` runs, the
    /// module's interfaces are purged, callbacks are told the unload
    /// happened, and the module leaves the registry. A failing `entry` is
    /// logged but does not stop the teardown.
    pub fn unload<F>(&self, module: ModuleId, entry: F) -> Result<ModuleInfo>
    where
        F: FnOnce(&ObjectManager, ModuleId) -> Result<()>,
    {
        let info = self
            .objects
            .module(module)
            .ok_or(ObjectError::ModuleNotFound(module))?;
        Self::check_transition(&info, ModuleOperation::Unload)?;

        self.objects.set_module_state(module, ModuleState::Unloading)?;
        self.objects.dispatch(module, ModuleOperation::Unload, true)?;

        if let Err(e) = entry(&self.objects, module) {
            warn!(module = %module, error = %e, "Module unload entry point failed, continuing teardown");
        }

        let purged = self.objects.purge_module(module)?;
        self.objects.dispatch(module, ModuleOperation::Unload, false)?;
        let info = self.objects.unregister_module(module)?;

        info!(module = %module, name = %info.name, purged, "Module unloaded");
        Ok(info)
    }

    /// Unload every module, most recently loaded first
    ///
    /// A module that fails to unload is logged and skipped.
    pub fn unload_all(&self) {
        info!("Unloading all modules");
        for info in self.objects.modules().into_iter().rev() {
            if let Err(e) = self.unload(info.id, |_, _| Ok(())) {
                warn!(module = %info.id, error = %e, "Failed to unload module");
            }
        }
    }

    fn check_transition(info: &ModuleInfo, operation: ModuleOperation) -> Result<()> {
        let allowed = match operation {
            ModuleOperation::Preinitialize => matches!(info.state, ModuleState::Loaded),
            ModuleOperation::Initialize => {
                matches!(info.state, ModuleState::Loaded | ModuleState::Preinitialized)
            }
            ModuleOperation::Unload => !matches!(info.state, ModuleState::Unloading),
        };

        if allowed {
            Ok(())
        } else {
            Err(ObjectError::invalid_state(format!(
                "Module {} cannot {} while {}",
                info.id, operation, info.state
            )))
        }
    }

    /// Get module count
    pub fn count(&self) -> usize {
        self.objects.module_count()
    }

    /// Get registry statistics
    pub fn stats(&self) -> RegistryStats {
        let modules = self.objects.modules();

        RegistryStats {
            modules: modules.len(),
            initialized: modules.iter().filter(|m| m.state.is_initialized()).count(),
            failed: modules.iter().filter(|m| m.state.is_failed()).count(),
            callbacks: modules.iter().filter(|m| m.has_callback).count(),
            interfaces: self.objects.interface_count(),
        }
    }
}

/// Registry statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStats {
    /// Number of loaded modules
    pub modules: usize,

    /// Number of initialized modules
    pub initialized: usize,

    /// Number of failed modules
    pub failed: usize,

    /// Number of modules with a lifecycle callback
    pub callbacks: usize,

    /// Number of published interface entries
    pub interfaces: usize,
}
