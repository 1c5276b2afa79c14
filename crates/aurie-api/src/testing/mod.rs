//! Testing utilities for module developers
//!
//! This module provides mocks and recorders to make interface and
//! lifecycle testing easier.

pub mod mocks;
pub mod recorder;

pub use mocks::MockInterface;
pub use recorder::CallbackRecorder;
