//! Simulation manifests

use aurie_api::{Interface, InterfaceError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A set of modules to load, initialize and unload in order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    /// Modules in load order
    #[serde(default)]
    pub modules: Vec<ModuleSpec>,
}

/// One simulated module
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleSpec {
    /// Module name
    pub name: String,

    /// Image path reported to the registry
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Interface names published during initialize
    #[serde(default)]
    pub publishes: Vec<String>,

    /// Interface names that must exist before initialize succeeds
    #[serde(default)]
    pub requires: Vec<String>,

    /// Register a lifecycle callback that logs every event
    #[serde(default)]
    pub listen: bool,
}

impl Manifest {
    /// Check for empty and duplicate module names
    pub fn validate(&self) -> Result<(), String> {
        let mut seen: Vec<&str> = Vec::with_capacity(self.modules.len());
        for module in &self.modules {
            if module.name.trim().is_empty() {
                return Err("module name must not be empty".to_string());
            }
            if seen.iter().any(|s| s.eq_ignore_ascii_case(&module.name)) {
                return Err(format!("duplicate module name: {}", module.name));
            }
            seen.push(&module.name);
        }
        Ok(())
    }
}

/// Placeholder interface published by simulated modules
#[derive(Debug)]
pub struct NamedInterface {
    name: String,
}

impl NamedInterface {
    /// Create a new interface object
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Interface for NamedInterface {
    fn create(&self) -> Result<(), InterfaceError> {
        tracing::debug!(interface = %self.name, "Interface created");
        Ok(())
    }

    fn destroy(&self) {
        tracing::debug!(interface = %self.name, "Interface destroyed");
    }
}
