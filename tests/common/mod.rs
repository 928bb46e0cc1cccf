//! Shared helpers for lifecycle scenario tests.

use std::sync::{Arc, Mutex};

use lifecycle_hooks::registry::CallbackResult;

/// Records the order in which hook callbacks (and main) run.
#[derive(Clone, Default)]
pub struct Recorder {
    events: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, label: &str) {
        self.events.lock().unwrap().push(label.to_string());
    }

    /// A callback that records `label` and succeeds.
    pub fn hook(&self, label: &str) -> impl FnOnce() -> CallbackResult + Send + 'static {
        let recorder = self.clone();
        let label = label.to_string();
        move || {
            recorder.push(&label);
            Ok(())
        }
    }

    /// A callback that records `label` and then fails.
    #[allow(dead_code)]
    pub fn failing(&self, label: &str) -> impl FnOnce() -> CallbackResult + Send + 'static {
        let recorder = self.clone();
        let label = label.to_string();
        move || {
            recorder.push(&label);
            Err(format!("{label} failed").into())
        }
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}
