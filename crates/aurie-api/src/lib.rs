//! # Aurie API
//!
//! This crate provides the SDK modules build against to publish and consume
//! interfaces through the Aurie object manager.
//!
//! ## Concepts
//!
//! - **Interfaces**: named capability objects with a `create`/`destroy` lifecycle
//! - **Modules**: loaded plugin units, identified by [`ModuleId`]
//! - **Module callbacks**: observers of every module's lifecycle operations
//!
//! ## Example
//!
//! ```rust
//! use aurie_api::prelude::*;
//!
//! #[derive(Debug)]
//! struct Clock;
//!
//! impl Interface for Clock {
//!     fn create(&self) -> Result<(), InterfaceError> {
//!         Ok(())
//!     }
//!
//!     fn destroy(&self) {}
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod error;
pub mod interface;
pub mod module;

#[cfg(feature = "testing")]
pub mod testing;

// Re-export commonly used types
pub use error::InterfaceError;
pub use interface::{downcast_interface, same_interface, AsAny, Interface, InterfaceHandle};
pub use module::{ModuleCallback, ModuleEvent, ModuleId, ModuleOperation, ModuleState};

/// Prelude module with commonly used types
pub mod prelude {
    pub use crate::error::InterfaceError;
    pub use crate::interface::{Interface, InterfaceHandle};
    pub use crate::module::{ModuleCallback, ModuleEvent, ModuleId, ModuleOperation};
}
