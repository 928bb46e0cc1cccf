//! Hook entries and the registration builder.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error type a hook callback may return.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

/// Outcome of a single hook callback.
pub type CallbackResult = Result<(), CallbackError>;

/// A registered hook body. Consumed by the pass that runs it.
pub type Callback = Box<dyn FnOnce() -> CallbackResult + Send>;

/// Point in the program lifetime a hook is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Before control passes to main.
    Startup,
    /// After main returns or orderly termination begins.
    Cleanup,
}

impl Phase {
    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Startup => "startup",
            Phase::Cleanup => "cleanup",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one registered hook. Wraps its registration sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct HookHandle(u64);

impl HookHandle {
    pub(crate) fn new(sequence: u64) -> Self {
        Self(sequence)
    }

    /// Registration sequence number (monotonic per registry).
    pub fn sequence(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for HookHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Execution status of a hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HookStatus {
    /// Registered, not yet reached by its pass.
    Pending,
    /// Callback currently executing.
    Running,
    /// Callback returned successfully.
    Completed,
    /// Callback returned an error or panicked.
    Failed,
    /// Not eligible when its pass ran.
    Skipped,
}

/// Description of a hook to register.
///
/// ```
/// use lifecycle_hooks::registry::HookSpec;
///
/// let spec = HookSpec::startup()
///     .name("open-db")
///     .priority(-10)
///     .callback(|| Ok(()));
/// ```
pub struct HookSpec {
    pub(crate) phase: Phase,
    pub(crate) name: Option<String>,
    pub(crate) module: Option<String>,
    pub(crate) priority: Option<i32>,
    pub(crate) releases: Option<HookHandle>,
    pub(crate) callback: Option<Callback>,
}

impl HookSpec {
    /// Start describing a hook for `phase`.
    pub fn new(phase: Phase) -> Self {
        Self {
            phase,
            name: None,
            module: None,
            priority: None,
            releases: None,
            callback: None,
        }
    }

    pub fn startup() -> Self {
        Self::new(Phase::Startup)
    }

    pub fn cleanup() -> Self {
        Self::new(Phase::Cleanup)
    }

    /// A cleanup hook that releases what the startup hook `owner` acquired.
    ///
    /// It only runs if `owner` completed.
    pub fn releasing(owner: HookHandle) -> Self {
        let mut spec = Self::cleanup();
        spec.releases = Some(owner);
        spec
    }

    /// Diagnostic name. Defaults to `hook-<sequence>`.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Owning module, normally stamped by the loader.
    pub fn module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    /// Lower runs earlier. On cleanup hooks this overrides LIFO ordering.
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn callback<F>(mut self, callback: F) -> Self
    where
        F: FnOnce() -> CallbackResult + Send + 'static,
    {
        self.callback = Some(Box::new(callback));
        self
    }

    /// Set or clear the callback from an already boxed value.
    pub fn boxed_callback(mut self, callback: Option<Callback>) -> Self {
        self.callback = callback;
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }
}

impl fmt::Debug for HookSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookSpec")
            .field("phase", &self.phase)
            .field("name", &self.name)
            .field("module", &self.module)
            .field("priority", &self.priority)
            .field("releases", &self.releases)
            .field("has_callback", &self.callback.is_some())
            .finish()
    }
}

/// A hook held by the registry.
pub(crate) struct HookEntry {
    pub(crate) handle: HookHandle,
    pub(crate) phase: Phase,
    pub(crate) name: String,
    pub(crate) module: Option<String>,
    pub(crate) priority: i32,
    /// Cleanup hooks only order by priority when one was given.
    pub(crate) explicit_priority: bool,
    pub(crate) releases: Option<HookHandle>,
    pub(crate) callback: Option<Callback>,
    pub(crate) status: HookStatus,
}

impl HookEntry {
    pub(crate) fn new(
        handle: HookHandle,
        phase: Phase,
        spec_fields: SpecFields,
        callback: Callback,
    ) -> Self {
        let SpecFields {
            name,
            module,
            priority,
            releases,
        } = spec_fields;
        Self {
            handle,
            phase,
            name: name.unwrap_or_else(|| format!("hook-{}", handle.sequence())),
            module,
            priority: priority.unwrap_or(0),
            explicit_priority: priority.is_some(),
            releases,
            callback: Some(callback),
            status: HookStatus::Pending,
        }
    }

    /// Ascending sort key for startup and prioritized cleanup hooks.
    pub(crate) fn order_key(&self) -> (i32, u64) {
        (self.priority, self.handle.sequence())
    }
}

/// The non-callback parts of a [`HookSpec`].
pub(crate) struct SpecFields {
    pub(crate) name: Option<String>,
    pub(crate) module: Option<String>,
    pub(crate) priority: Option<i32>,
    pub(crate) releases: Option<HookHandle>,
}

impl HookSpec {
    pub(crate) fn into_parts(self) -> (Phase, SpecFields, Option<Callback>) {
        (
            self.phase,
            SpecFields {
                name: self.name,
                module: self.module,
                priority: self.priority,
                releases: self.releases,
            },
            self.callback,
        )
    }
}
