//! # Aurie Runtime
//!
//! Object manager and module lifecycle dispatch for Aurie hosts.
//!
//! ## Features
//!
//! - **Interface Registry**: publish, look up and destroy named interfaces
//! - **Ownership Checks**: only the publishing module may destroy an interface
//! - **Lifecycle Callbacks**: every module hears about every module's transitions
//! - **Module Manager**: loader-facing helpers that bracket entry points
//!
//! ## Example
//!
//! ```rust
//! use aurie_runtime::prelude::*;
//! use std::sync::Arc;
//!
//! #[derive(Debug)]
//! struct Net;
//!
//! impl Interface for Net {
//!     fn create(&self) -> std::result::Result<(), InterfaceError> {
//!         Ok(())
//!     }
//!
//!     fn destroy(&self) {}
//! }
//!
//! # fn example() -> Result<()> {
//! let objects = ObjectManager::new();
//! let module = objects.register_module("net");
//!
//! objects.publish(module, "Net", Arc::new(Net))?;
//! assert!(objects.exists("net"));
//!
//! let net: Arc<Net> = objects.get_as("Net")?;
//! objects.destroy_by_owner(module, "Net")?;
//! # drop(net);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod config;
pub mod dispatch;
pub mod error;
pub mod manager;
pub mod registry;
pub mod table;

pub use config::{load_from_file, load_from_str, ConfigFormat, ObjectManagerConfig};
pub use error::{ObjectError, Result};
pub use manager::{ModuleManager, RegistryStats};
pub use registry::{ModuleInfo, ObjectManager};
pub use table::{InterfaceInfo, InterfaceTableEntry, NameComparison};

// Re-export module API types for convenience
pub use aurie_api::{
    Interface, InterfaceError, InterfaceHandle, ModuleCallback, ModuleEvent, ModuleId,
    ModuleOperation, ModuleState,
};

/// Prelude module with commonly used types
pub mod prelude {
    pub use crate::error::{ObjectError, Result};
    pub use crate::manager::ModuleManager;
    pub use crate::registry::ObjectManager;
    pub use crate::table::NameComparison;
    pub use aurie_api::prelude::*;
}
