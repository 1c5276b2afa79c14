//! Module lifecycle callbacks

use crate::error::{ObjectError, Result};
use crate::registry::ObjectManager;
use aurie_api::{ModuleCallback, ModuleEvent, ModuleId, ModuleOperation};
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};

impl ObjectManager {
    /// Register `module`'s lifecycle callback, replacing any previous one
    pub fn set_module_callback(&self, module: ModuleId, callback: ModuleCallback) -> Result<()> {
        let mut registry = self.registry().write();
        let record = registry
            .modules
            .iter_mut()
            .find(|record| record.id == module)
            .ok_or(ObjectError::ModuleNotFound(module))?;

        if record.callback.replace(callback).is_some() {
            debug!(module = %module, "Module callback replaced");
        } else {
            debug!(module = %module, "Module callback registered");
        }
        Ok(())
    }

    /// Remove `module`'s lifecycle callback, returning it if one was set
    pub fn clear_module_callback(&self, module: ModuleId) -> Result<Option<ModuleCallback>> {
        let mut registry = self.registry().write();
        let record = registry
            .modules
            .iter_mut()
            .find(|record| record.id == module)
            .ok_or(ObjectError::ModuleNotFound(module))?;

        Ok(record.callback.take())
    }

    /// Notify every registered callback that `affected` undergoes `operation`
    ///
    /// Callbacks are invoked in load order, each exactly once; modules
    /// without a callback are skipped. `is_future_call` is relayed as given.
    /// Callbacks run with the registry unlocked and return nothing, so the
    /// only error is an unknown `affected` module. Returns how many
    /// callbacks ran.
    pub fn dispatch(
        &self,
        affected: ModuleId,
        operation: ModuleOperation,
        is_future_call: bool,
    ) -> Result<usize> {
        let (event, listeners) = {
            let registry = self.registry().read();
            let record = registry
                .module(affected)
                .ok_or(ObjectError::ModuleNotFound(affected))?;

            let event = ModuleEvent::new(affected, record.name.clone(), operation, is_future_call);
            let listeners: Vec<(ModuleId, ModuleCallback)> = registry
                .modules
                .iter()
                .filter_map(|record| record.callback.clone().map(|cb| (record.id, cb)))
                .collect();
            (event, listeners)
        };

        debug!(
            module = %affected,
            operation = %operation,
            is_future_call,
            listeners = listeners.len(),
            "Dispatching module callbacks"
        );

        for (listener, callback) in &listeners {
            if self.config().isolate_callback_panics {
                if panic::catch_unwind(AssertUnwindSafe(|| callback(&event))).is_err() {
                    warn!(
                        listener = %listener,
                        module = %affected,
                        operation = %operation,
                        "Module callback panicked"
                    );
                }
            } else {
                callback(&event);
            }
        }

        Ok(listeners.len())
    }
}
