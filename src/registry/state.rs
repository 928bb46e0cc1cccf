//! Registry state machine.
//!
//! # States
//! - Collecting: hooks may be registered
//! - StartupRunning: startup hooks are draining
//! - Ready: main is running, only at-exit handlers may be added
//! - CleanupRunning: cleanup hooks are draining
//! - Done: terminal
//!
//! # State Transitions
//! ```text
//! Collecting → StartupRunning: run_startup_phase
//! StartupRunning → Ready: every startup hook completed
//! StartupRunning → Done: a startup hook failed
//! Ready → CleanupRunning: run_cleanup_phase
//! CleanupRunning → Done: pass finished (failures or not)
//! ```

use std::fmt;

use serde::Serialize;

use crate::error::HookError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistryState {
    Collecting,
    StartupRunning,
    Ready,
    CleanupRunning,
    Done,
}

impl RegistryState {
    /// Fail with `InvalidPhase` unless the registry is in `expected`.
    pub(crate) fn require(self, expected: RegistryState, operation: &'static str) -> Result<(), HookError> {
        if self == expected {
            Ok(())
        } else {
            Err(HookError::InvalidPhase {
                operation,
                state: self,
            })
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RegistryState::Done)
    }
}

impl fmt::Display for RegistryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RegistryState::Collecting => "collecting",
            RegistryState::StartupRunning => "running startup hooks",
            RegistryState::Ready => "ready",
            RegistryState::CleanupRunning => "running cleanup hooks",
            RegistryState::Done => "done",
        };
        f.write_str(label)
    }
}
