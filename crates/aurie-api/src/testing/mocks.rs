//! Mock implementations for testing

use crate::error::{InterfaceError, Result};
use crate::interface::Interface;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Mock interface that counts its lifecycle calls
///
/// Clones share counters, so a test can keep one clone while the
/// registry holds another.
#[derive(Debug, Clone, Default)]
pub struct MockInterface {
    create_calls: Arc<AtomicUsize>,
    destroy_calls: Arc<AtomicUsize>,
    fail_create: Arc<AtomicBool>,
}

impl MockInterface {
    /// Create a new mock interface
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock whose `create` always fails
    pub fn failing() -> Self {
        let mock = Self::new();
        mock.set_fail_create(true);
        mock
    }

    /// Make subsequent `create` calls fail or succeed
    pub fn set_fail_create(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    /// Get number of create calls
    pub fn create_call_count(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    /// Get number of destroy calls
    pub fn destroy_call_count(&self) -> usize {
        self.destroy_calls.load(Ordering::SeqCst)
    }
}

impl Interface for MockInterface {
    fn create(&self) -> Result<()> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(InterfaceError::create("mock configured to fail"));
        }
        Ok(())
    }

    fn destroy(&self) {
        self.destroy_calls.fetch_add(1, Ordering::SeqCst);
    }
}
