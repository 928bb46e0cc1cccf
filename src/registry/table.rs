//! The hook registry.

use std::cmp::Reverse;
use std::time::Instant;

use uuid::Uuid;

use super::entry::{CallbackResult, HookEntry, HookHandle, HookSpec, HookStatus, Phase};
use super::invoke::invoke;
use super::report::RunResult;
use super::state::RegistryState;
use crate::config::RegistryConfig;
use crate::error::{HookError, HookResult};
use crate::observability::metrics;

/// Which cleanup hooks a drain pass may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CleanupScope {
    /// Normal cleanup after main.
    Full,
    /// Release pass after a failed startup: paired hooks only.
    Unwind,
}

/// Position of a hook in one of the cleanup tables.
#[derive(Debug, Clone, Copy)]
enum Slot {
    AtExit(usize),
    Cleanup(usize),
}

/// Collects startup and cleanup hooks and runs each phase exactly once.
///
/// One instance per program (or per plugin increment). It is created empty,
/// filled while `Collecting`, and handed to the loader which drives the two
/// passes.
pub struct HookRegistry {
    id: Uuid,
    state: RegistryState,
    config: RegistryConfig,
    next_sequence: u64,
    /// Kept sorted by `(priority, sequence)`.
    startup: Vec<HookEntry>,
    /// Registration order; ordered when drained.
    cleanup: Vec<HookEntry>,
    /// Handlers added while main runs.
    at_exit: Vec<HookEntry>,
    /// Startup hooks that completed, in execution order.
    started: Vec<HookHandle>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: RegistryState::Collecting,
            config,
            next_sequence: 1,
            startup: Vec::new(),
            cleanup: Vec::new(),
            at_exit: Vec::new(),
            started: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> RegistryState {
        self.state
    }

    /// Number of hooks registered for `phase` (at-exit handlers count as cleanup).
    pub fn len(&self, phase: Phase) -> usize {
        match phase {
            Phase::Startup => self.startup.len(),
            Phase::Cleanup => self.cleanup.len() + self.at_exit.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.startup.is_empty() && self.cleanup.is_empty() && self.at_exit.is_empty()
    }

    pub fn status(&self, handle: HookHandle) -> Option<HookStatus> {
        self.entry(handle).map(|e| e.status)
    }

    /// Planned startup order.
    pub fn startup_order(&self) -> Vec<HookHandle> {
        self.startup.iter().map(|e| e.handle).collect()
    }

    /// Startup hooks that completed, in the order they ran.
    pub fn started(&self) -> &[HookHandle] {
        &self.started
    }

    /// Register a startup or cleanup hook.
    ///
    /// Legal only while collecting. A rejected registration leaves both
    /// sequences untouched.
    pub fn register(&mut self, spec: HookSpec) -> HookResult<HookHandle> {
        self.state.require(RegistryState::Collecting, "register")?;

        let (phase, fields, callback) = spec.into_parts();
        let callback = callback.ok_or(HookError::NullCallback)?;
        if let Some(owner) = fields.releases {
            if !self.startup.iter().any(|e| e.handle == owner) {
                return Err(HookError::UnknownHandle(owner));
            }
        }

        let handle = self.next_handle();
        let entry = HookEntry::new(handle, phase, fields, callback);
        tracing::debug!(
            registry = %self.id,
            hook = %entry.name,
            module = entry.module.as_deref().unwrap_or("-"),
            phase = %phase,
            seq = handle.sequence(),
            priority = entry.priority,
            "Hook registered"
        );
        metrics::record_registration(phase);

        match phase {
            Phase::Startup => {
                // Sequences only grow, so inserting after every equal priority keeps ties stable.
                let at = self.startup.partition_point(|e| e.priority <= entry.priority);
                self.startup.insert(at, entry);
            }
            Phase::Cleanup => self.cleanup.push(entry),
        }
        Ok(handle)
    }

    /// Register a cleanup handler while main is running.
    ///
    /// Handlers run first in the cleanup pass, most recent first.
    pub fn at_exit<F>(&mut self, name: impl Into<String>, callback: F) -> HookResult<HookHandle>
    where
        F: FnOnce() -> CallbackResult + Send + 'static,
    {
        self.state.require(RegistryState::Ready, "at_exit")?;

        let (phase, fields, callback) = HookSpec::cleanup().name(name).callback(callback).into_parts();
        let callback = callback.ok_or(HookError::NullCallback)?;
        let handle = self.next_handle();
        let entry = HookEntry::new(handle, phase, fields, callback);
        tracing::debug!(
            registry = %self.id,
            hook = %entry.name,
            seq = handle.sequence(),
            "At-exit handler registered"
        );
        metrics::record_registration(Phase::Cleanup);
        self.at_exit.push(entry);
        Ok(handle)
    }

    /// Run every startup hook in `(priority, sequence)` order.
    ///
    /// The first failure aborts the pass: later hooks are skipped, the
    /// failed hook is not considered started, hooks that did start are
    /// unwound (when configured) and the registry ends in `Done`.
    pub fn run_startup_phase(&mut self) -> HookResult<RunResult> {
        self.state.require(RegistryState::Collecting, "run_startup_phase")?;
        self.state = RegistryState::StartupRunning;

        let started_at = Instant::now();
        let mut result = RunResult::new(Phase::Startup);
        let mut failure = None;
        tracing::info!(registry = %self.id, hooks = self.startup.len(), "Running startup hooks");

        for entry in self.startup.iter_mut() {
            if failure.is_some() {
                entry.status = HookStatus::Skipped;
                result.skipped.push(entry.handle);
                continue;
            }
            result.invoked.push(entry.handle);
            match invoke(entry, self.id, self.config.catch_panics) {
                Ok(()) => {
                    result.completed.push(entry.handle);
                    self.started.push(entry.handle);
                }
                Err(f) => {
                    result.failures.push(f.clone());
                    failure = Some(f);
                }
            }
        }

        result.elapsed = started_at.elapsed();
        metrics::record_phase_duration(Phase::Startup, result.elapsed);

        let Some(failure) = failure else {
            self.state = RegistryState::Ready;
            tracing::info!(
                registry = %self.id,
                completed = result.completed.len(),
                elapsed_ms = result.elapsed.as_millis() as u64,
                "Startup hooks completed"
            );
            return Ok(result);
        };

        tracing::error!(
            registry = %self.id,
            hook = %failure.name,
            error = %failure.message,
            skipped = result.skipped.len(),
            "Startup aborted"
        );
        let unwind = if self.config.unwind_on_startup_failure {
            self.drain_cleanup(CleanupScope::Unwind)
        } else {
            self.skip_all_cleanup()
        };
        self.state = RegistryState::Done;

        Err(HookError::CallbackFailure {
            failure,
            startup: Box::new(result),
            unwind: Box::new(unwind),
        })
    }

    /// Run every eligible cleanup hook, best-effort.
    ///
    /// A failing hook never stops the pass; all failures come back together.
    pub fn run_cleanup_phase(&mut self) -> HookResult<RunResult> {
        self.state.require(RegistryState::Ready, "run_cleanup_phase")?;
        self.state = RegistryState::CleanupRunning;

        let result = self.drain_cleanup(CleanupScope::Full);
        self.state = RegistryState::Done;

        if result.is_success() {
            tracing::info!(
                registry = %self.id,
                completed = result.completed.len(),
                elapsed_ms = result.elapsed.as_millis() as u64,
                "Cleanup hooks completed"
            );
        } else {
            tracing::error!(
                registry = %self.id,
                failures = result.failures.len(),
                completed = result.completed.len(),
                "Cleanup finished with failures"
            );
        }
        Ok(result)
    }

    fn next_handle(&mut self) -> HookHandle {
        let handle = HookHandle::new(self.next_sequence);
        self.next_sequence += 1;
        handle
    }

    fn entry(&self, handle: HookHandle) -> Option<&HookEntry> {
        self.startup
            .iter()
            .chain(self.cleanup.iter())
            .chain(self.at_exit.iter())
            .find(|e| e.handle == handle)
    }

    fn is_eligible(&self, entry: &HookEntry, scope: CleanupScope) -> bool {
        match entry.releases {
            Some(owner) => self.started.contains(&owner),
            None => scope == CleanupScope::Full,
        }
    }

    /// Order eligible cleanup hooks.
    ///
    /// At-exit handlers (LIFO), then prioritized hooks ascending, then
    /// paired hooks in reverse startup order, then unpaired hooks LIFO.
    fn cleanup_plan(&self, scope: CleanupScope) -> (Vec<Slot>, Vec<usize>) {
        let mut plan = Vec::with_capacity(self.at_exit.len() + self.cleanup.len());
        if scope == CleanupScope::Full {
            plan.extend((0..self.at_exit.len()).rev().map(Slot::AtExit));
        }

        let mut prioritized = Vec::new();
        let mut paired = Vec::new();
        let mut unpaired = Vec::new();
        let mut ineligible = Vec::new();

        for (idx, entry) in self.cleanup.iter().enumerate() {
            if !self.is_eligible(entry, scope) {
                ineligible.push(idx);
            } else if entry.explicit_priority {
                prioritized.push(idx);
            } else if let Some(owner) = entry.releases {
                let position = self.started.iter().position(|h| *h == owner).unwrap_or(0);
                paired.push((position, idx));
            } else {
                unpaired.push(idx);
            }
        }

        prioritized.sort_by_key(|&idx| self.cleanup[idx].order_key());
        paired.sort_by_key(|&(position, idx)| Reverse((position, self.cleanup[idx].handle)));
        unpaired.reverse();

        plan.extend(prioritized.into_iter().map(Slot::Cleanup));
        plan.extend(paired.into_iter().map(|(_, idx)| Slot::Cleanup(idx)));
        plan.extend(unpaired.into_iter().map(Slot::Cleanup));
        (plan, ineligible)
    }

    fn drain_cleanup(&mut self, scope: CleanupScope) -> RunResult {
        let started_at = Instant::now();
        let mut result = RunResult::new(Phase::Cleanup);
        let (plan, ineligible) = self.cleanup_plan(scope);

        for idx in ineligible {
            let entry = &mut self.cleanup[idx];
            entry.status = HookStatus::Skipped;
            result.skipped.push(entry.handle);
            tracing::debug!(
                registry = %self.id,
                hook = %entry.name,
                seq = entry.handle.sequence(),
                "Cleanup hook not eligible"
            );
        }

        tracing::info!(
            registry = %self.id,
            hooks = plan.len(),
            unwind = scope == CleanupScope::Unwind,
            "Running cleanup hooks"
        );

        for slot in plan {
            let entry = match slot {
                Slot::AtExit(idx) => &mut self.at_exit[idx],
                Slot::Cleanup(idx) => &mut self.cleanup[idx],
            };
            result.invoked.push(entry.handle);
            match invoke(entry, self.id, self.config.catch_panics) {
                Ok(()) => result.completed.push(entry.handle),
                Err(failure) => result.failures.push(failure),
            }
        }

        result.elapsed = started_at.elapsed();
        metrics::record_phase_duration(Phase::Cleanup, result.elapsed);
        result
    }

    fn skip_all_cleanup(&mut self) -> RunResult {
        let mut result = RunResult::new(Phase::Cleanup);
        for entry in self.cleanup.iter_mut() {
            entry.status = HookStatus::Skipped;
            result.skipped.push(entry.handle);
        }
        result
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRegistry")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("startup", &self.startup.len())
            .field("cleanup", &self.cleanup.len())
            .field("at_exit", &self.at_exit.len())
            .finish()
    }
}
