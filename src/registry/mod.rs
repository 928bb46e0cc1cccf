//! Lifecycle hook registry.
//!
//! # Data Flow
//! ```text
//! Module initialization:
//!     HookSpec (phase, priority, callback)
//!     → table.rs register (Collecting only)
//!     → startup table sorted by (priority, sequence)
//!
//! Before main:
//!     run_startup_phase → invoke.rs per hook → RunResult
//!     failure → skip the rest, unwind started hooks, Done
//!
//! After main:
//!     run_cleanup_phase → at-exit (LIFO), prioritized, paired (reverse
//!     startup order), unpaired (LIFO) → RunResult with every failure
//! ```
//!
//! # Design Decisions
//! - One explicit instance per program, passed to the loader by reference
//! - Each phase drains exactly once; callbacks are `FnOnce`
//! - Startup is fail-fast, cleanup is best-effort
//! - Hooks cannot be removed once registered

pub mod entry;
mod invoke;
pub mod report;
pub mod state;
pub mod table;

pub use entry::{Callback, CallbackError, CallbackResult, HookHandle, HookSpec, HookStatus, Phase};
pub use report::{HookFailure, RunResult};
pub use state::RegistryState;
pub use table::HookRegistry;
