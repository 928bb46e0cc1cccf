//! Registry error definitions.

use thiserror::Error;

use crate::registry::{HookFailure, HookHandle, RegistryState, RunResult};

/// Errors surfaced by registry and loader operations.
#[derive(Debug, Error)]
pub enum HookError {
    /// A hook was registered without a callback.
    #[error("hook registration has no callback")]
    NullCallback,

    /// The operation is not legal in the registry's current state.
    #[error("`{operation}` is not allowed while the registry is {state}")]
    InvalidPhase {
        operation: &'static str,
        state: RegistryState,
    },

    /// A cleanup hook referenced a startup hook this registry does not hold.
    #[error("no startup hook {0} is registered")]
    UnknownHandle(HookHandle),

    /// A startup hook failed; the pass was aborted.
    ///
    /// `startup` is the aborted pass (completed, skipped and the failure
    /// itself); `unwind` records the release of hooks that had already
    /// started.
    #[error("startup aborted: {failure}")]
    CallbackFailure {
        failure: HookFailure,
        startup: Box<RunResult>,
        unwind: Box<RunResult>,
    },

    /// A module failed while registering its hooks, leaving the registry
    /// with part of its hooks.
    #[error("module `{module}` failed to load; refusing to launch")]
    IncompleteLoad { module: String },
}

/// Result type for registry operations.
pub type HookResult<T> = Result<T, HookError>;
