//! Program launch around the hook registry.
//!
//! # Responsibilities
//! - Register modules in explicit loader order
//! - Run startup hooks, then main, then cleanup hooks
//! - Never enter main after a failed startup
//! - Map the outcome to a process exit status
//!
//! # Design Decisions
//! - Cross-module order is the order modules are loaded, nothing implicit
//! - Cleanup failures never hide main's own non-zero status

use std::future::Future;

use serde::Serialize;

use super::module::{HookModule, ModuleScope};
use super::shutdown::{self, Shutdown};
use crate::config::{ExitConfig, RuntimeConfig};
use crate::error::{HookError, HookResult};
use crate::registry::{HookFailure, HookRegistry, RunResult};

/// How a launch ended.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LaunchOutcome {
    /// Main ran and cleanup followed.
    Completed {
        startup: RunResult,
        exit_status: i32,
        cleanup: RunResult,
    },
    /// A startup hook failed; main never ran.
    StartupAborted {
        failure: HookFailure,
        startup: RunResult,
        unwind: RunResult,
    },
}

/// Result of [`Loader::launch`].
#[derive(Debug, Clone, Serialize)]
pub struct LaunchReport {
    #[serde(flatten)]
    pub outcome: LaunchOutcome,
    #[serde(skip)]
    exit: ExitConfig,
}

impl LaunchReport {
    pub fn main_ran(&self) -> bool {
        matches!(self.outcome, LaunchOutcome::Completed { .. })
    }

    /// Cleanup (or unwind) failures, never empty-by-omission.
    pub fn cleanup_failures(&self) -> &[HookFailure] {
        match &self.outcome {
            LaunchOutcome::Completed { cleanup, .. } => &cleanup.failures,
            LaunchOutcome::StartupAborted { unwind, .. } => &unwind.failures,
        }
    }

    /// Process exit status for this outcome.
    ///
    /// A non-zero status from main wins; otherwise cleanup failures map to
    /// the configured cleanup code.
    pub fn exit_code(&self) -> i32 {
        match &self.outcome {
            LaunchOutcome::StartupAborted { .. } => self.exit.startup_failure_code,
            LaunchOutcome::Completed {
                exit_status,
                cleanup,
                ..
            } => {
                if *exit_status != 0 {
                    *exit_status
                } else if !cleanup.is_success() {
                    self.exit.cleanup_failure_code
                } else {
                    0
                }
            }
        }
    }
}

/// Hosts one program: collects module hooks and drives the two passes.
///
/// Registered hooks cannot be withdrawn, so a module that fails halfway
/// through [`Loader::load`] leaves the loader unable to launch.
pub struct Loader {
    registry: HookRegistry,
    modules: Vec<String>,
    failed: Option<String>,
    exit: ExitConfig,
}

impl Loader {
    pub fn new(config: &RuntimeConfig) -> Self {
        Self {
            registry: HookRegistry::with_config(config.registry.clone()),
            modules: Vec::new(),
            failed: None,
            exit: config.exit,
        }
    }

    /// Let `module` register its hooks. Order of calls is startup tie-break order.
    pub fn load(&mut self, module: &dyn HookModule) -> HookResult<()> {
        let name = module.name().to_string();
        let mut scope = ModuleScope::new(&name, &mut self.registry);
        if let Err(e) = module.register(&mut scope) {
            tracing::error!(
                module = %name,
                registered = scope.handles().len(),
                error = %e,
                "Module failed to load"
            );
            if self.failed.is_none() {
                self.failed = Some(name);
            }
            return Err(e);
        }
        tracing::info!(
            module = %name,
            hooks = scope.handles().len(),
            "Module loaded"
        );
        self.modules.push(name);
        Ok(())
    }

    /// Modules loaded so far, in load order.
    pub fn modules(&self) -> &[String] {
        &self.modules
    }

    pub fn registry(&self) -> &HookRegistry {
        &self.registry
    }

    /// Run startup hooks, `main`, then cleanup hooks.
    ///
    /// `main` receives the registry so it can add at-exit handlers. A
    /// startup failure is reported, not returned as an error; `Err` means
    /// the loader itself was misused or a module failed to load.
    pub fn launch<F>(mut self, main: F) -> HookResult<LaunchReport>
    where
        F: FnOnce(&mut HookRegistry) -> i32,
    {
        let startup = match self.start()? {
            Ok(startup) => startup,
            Err(report) => return Ok(report),
        };

        tracing::info!("Entering main");
        let exit_status = main(&mut self.registry);
        tracing::info!(exit_status, "Main returned");

        self.finish(startup, exit_status)
    }

    /// Like [`Loader::launch`] for an async main that may be cut short.
    ///
    /// Cleanup runs when `main` completes or when `shutdown` fires,
    /// whichever comes first.
    pub async fn launch_until_shutdown<F, Fut>(
        mut self,
        shutdown: &Shutdown,
        main: F,
    ) -> HookResult<LaunchReport>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = i32>,
    {
        let mut signal = shutdown.subscribe();
        let startup = match self.start()? {
            Ok(startup) => startup,
            Err(report) => return Ok(report),
        };

        tracing::info!("Entering main");
        let exit_status = tokio::select! {
            status = main() => {
                tracing::info!(exit_status = status, "Main returned");
                status
            }
            reason = shutdown::recv_reason(&mut signal) => {
                tracing::info!(%reason, "Main interrupted, running cleanup");
                reason.exit_status()
            }
        };

        self.finish(startup, exit_status)
    }

    /// Outer `Err`: misuse. Inner `Err`: startup aborted, report ready.
    fn start(&mut self) -> HookResult<Result<RunResult, LaunchReport>> {
        if let Some(module) = &self.failed {
            return Err(HookError::IncompleteLoad {
                module: module.clone(),
            });
        }
        match self.registry.run_startup_phase() {
            Ok(startup) => Ok(Ok(startup)),
            Err(HookError::CallbackFailure {
                failure,
                startup,
                unwind,
            }) => {
                tracing::error!(error = %failure, "Not entering main");
                Ok(Err(LaunchReport {
                    outcome: LaunchOutcome::StartupAborted {
                        failure,
                        startup: *startup,
                        unwind: *unwind,
                    },
                    exit: self.exit,
                }))
            }
            Err(e) => Err(e),
        }
    }

    fn finish(mut self, startup: RunResult, exit_status: i32) -> HookResult<LaunchReport> {
        let cleanup = self.registry.run_cleanup_phase()?;
        for failure in &cleanup.failures {
            tracing::warn!(error = %failure, "Cleanup hook failure");
        }
        Ok(LaunchReport {
            outcome: LaunchOutcome::Completed {
                startup,
                exit_status,
                cleanup,
            },
            exit: self.exit,
        })
    }
}
