//! Callback recorder

use crate::module::{ModuleCallback, ModuleEvent};
use std::sync::{Arc, Mutex};

/// Records every event delivered to the callbacks it hands out
///
/// Each callback is tagged with a listener label so tests can assert on
/// dispatch order across modules.
#[derive(Debug, Clone, Default)]
pub struct CallbackRecorder {
    events: Arc<Mutex<Vec<(String, ModuleEvent)>>>,
}

impl CallbackRecorder {
    /// Create a new recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a callback that records under `listener`
    pub fn callback(&self, listener: impl Into<String>) -> ModuleCallback {
        let listener = listener.into();
        let events = Arc::clone(&self.events);
        Arc::new(move |event: &ModuleEvent| {
            events
                .lock()
                .unwrap()
                .push((listener.clone(), event.clone()));
        })
    }

    /// All recorded `(listener, event)` pairs in delivery order
    pub fn events(&self) -> Vec<(String, ModuleEvent)> {
        self.events.lock().unwrap().clone()
    }

    /// Listener labels in delivery order
    pub fn listeners(&self) -> Vec<String> {
        self.events().into_iter().map(|(listener, _)| listener).collect()
    }

    /// Number of recorded events
    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    /// Check if nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget everything recorded so far
    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{ModuleId, ModuleOperation};

    #[test]
    fn test_recorder_orders_listeners() {
        let recorder = CallbackRecorder::new();
        let first = recorder.callback("a");
        let second = recorder.callback("b");

        let event = ModuleEvent::new(ModuleId::from_raw(1), "x", ModuleOperation::Initialize, false);
        second(&event);
        first(&event);

        assert_eq!(recorder.listeners(), vec!["b".to_string(), "a".to_string()]);
        assert_eq!(recorder.len(), 2);

        recorder.clear();
        assert!(recorder.is_empty());
    }
}
