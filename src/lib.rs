//! Program lifecycle hook registry.
//!
//! Independently built modules register startup and cleanup callbacks; the
//! loader runs startup hooks before main and cleanup hooks after it, in a
//! deterministic order.

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod observability;
pub mod registry;

pub use config::RuntimeConfig;
pub use error::{HookError, HookResult};
pub use lifecycle::{Loader, Shutdown};
pub use registry::{HookHandle, HookRegistry, HookSpec, Phase, RunResult};
