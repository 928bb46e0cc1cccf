//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Launch (loader.rs):
//!     Load modules (module.rs) → Startup hooks → main → Cleanup hooks → exit code
//!
//! Termination (shutdown.rs, signals.rs):
//!     SIGTERM/SIGINT → Shutdown trigger → main abandoned → Cleanup hooks
//!
//! Plugins (plugin.rs):
//!     load → register + startup under one lock
//!     shutdown → cleanup per plugin, newest first
//! ```
//!
//! # Design Decisions
//! - Startup failure is fatal: main never runs
//! - Cleanup always runs to completion, failures are aggregated
//! - Exit status reflects main first, then hook failures

pub mod loader;
pub mod module;
pub mod plugin;
pub mod shutdown;
pub mod signals;

pub use loader::{LaunchOutcome, LaunchReport, Loader};
pub use module::{HookModule, ModuleFn, ModuleScope};
pub use plugin::{PluginCleanup, PluginHost};
pub use shutdown::{Shutdown, ShutdownReason};
