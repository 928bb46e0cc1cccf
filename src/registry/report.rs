//! Outcome of a phase pass.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use super::entry::{HookEntry, HookHandle, Phase};

/// A hook callback that returned an error or panicked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{phase} hook `{name}` ({handle}) failed: {message}")]
pub struct HookFailure {
    pub handle: HookHandle,
    pub name: String,
    pub module: Option<String>,
    pub phase: Phase,
    pub message: String,
}

impl HookFailure {
    pub(crate) fn from_entry(entry: &HookEntry, message: String) -> Self {
        Self {
            handle: entry.handle,
            name: entry.name.clone(),
            module: entry.module.clone(),
            phase: entry.phase,
            message,
        }
    }
}

/// Record of one startup, cleanup or unwind pass.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub phase: Phase,
    /// Hooks whose callback was called, in call order.
    pub invoked: Vec<HookHandle>,
    /// Subset of `invoked` that returned successfully.
    pub completed: Vec<HookHandle>,
    /// Hooks that were not eligible or never reached.
    pub skipped: Vec<HookHandle>,
    pub failures: Vec<HookFailure>,
    pub elapsed: Duration,
}

impl RunResult {
    pub(crate) fn new(phase: Phase) -> Self {
        Self {
            phase,
            invoked: Vec::new(),
            completed: Vec::new(),
            skipped: Vec::new(),
            failures: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn invoked_count(&self) -> usize {
        self.invoked.len()
    }
}
