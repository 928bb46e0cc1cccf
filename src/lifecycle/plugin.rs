//! Hooks from modules loaded after main has started.
//!
//! # Data Flow
//! ```text
//! load(plugin):
//!     lock → fresh registry → plugin registers → startup pass
//!         ok     → keep increment → unlock
//!         failed → drop increment (already unwound) → unlock
//!
//! shutdown():
//!     lock → cleanup pass per increment, newest first → unlock
//! ```
//!
//! # Design Decisions
//! - One registry per increment, so each plugin gets its own state machine
//! - A single mutex makes register-and-start atomic against other loads
//! - Hooks must not load plugins themselves; the lock is not reentrant

use std::sync::{Mutex, MutexGuard, PoisonError};

use super::module::{HookModule, ModuleScope};
use crate::config::RegistryConfig;
use crate::error::HookResult;
use crate::registry::{HookRegistry, RunResult};

struct Increment {
    plugin: String,
    registry: HookRegistry,
}

/// Cleanup outcome for one plugin.
#[derive(Debug, Clone)]
pub struct PluginCleanup {
    pub plugin: String,
    pub result: RunResult,
}

/// Loads plugin hook increments at runtime and releases them on shutdown.
pub struct PluginHost {
    config: RegistryConfig,
    loaded: Mutex<Vec<Increment>>,
}

impl PluginHost {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            config,
            loaded: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Increment>> {
        // A poisoned lock only means a hook panicked with catch_panics off;
        // the increments list itself is still consistent.
        self.loaded.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register `plugin`'s hooks and run its startup pass as one step.
    ///
    /// On failure the plugin is not kept and its started hooks have already
    /// been unwound.
    pub fn load(&self, plugin: &dyn HookModule) -> HookResult<RunResult> {
        let mut loaded = self.lock();

        let name = plugin.name().to_string();
        let mut registry = HookRegistry::with_config(self.config.clone());
        let mut scope = ModuleScope::new(&name, &mut registry);
        plugin.register(&mut scope)?;

        let result = registry.run_startup_phase().inspect_err(|e| {
            tracing::error!(plugin = %name, error = %e, "Plugin startup failed");
        })?;

        tracing::info!(
            plugin = %name,
            registry = %registry.id(),
            completed = result.completed.len(),
            "Plugin loaded"
        );
        loaded.push(Increment {
            plugin: name,
            registry,
        });
        Ok(result)
    }

    /// Names of loaded plugins, in load order.
    pub fn plugins(&self) -> Vec<String> {
        self.lock().iter().map(|i| i.plugin.clone()).collect()
    }

    /// Run cleanup for every loaded plugin, most recently loaded first.
    ///
    /// Every increment is cleaned even if earlier ones fail.
    pub fn shutdown(&self) -> Vec<PluginCleanup> {
        let mut loaded = self.lock();
        let mut results = Vec::with_capacity(loaded.len());

        while let Some(mut increment) = loaded.pop() {
            match increment.registry.run_cleanup_phase() {
                Ok(result) => results.push(PluginCleanup {
                    plugin: increment.plugin,
                    result,
                }),
                Err(e) => {
                    tracing::error!(plugin = %increment.plugin, error = %e, "Plugin cleanup skipped");
                }
            }
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HookError;
    use crate::lifecycle::module::ModuleFn;
    use std::sync::Arc;

    fn plugin(
        name: &'static str,
        log: &Arc<Mutex<Vec<String>>>,
        fail_startup: bool,
    ) -> impl HookModule {
        let log = log.clone();
        ModuleFn::new(name, move |scope| {
            let (up, down) = (log.clone(), log.clone());
            scope.acquire(
                "init",
                move || {
                    up.lock().unwrap().push(format!("{name} up"));
                    if fail_startup {
                        Err("init refused".into())
                    } else {
                        Ok(())
                    }
                },
                move || {
                    down.lock().unwrap().push(format!("{name} down"));
                    Ok(())
                },
            )?;
            Ok(())
        })
    }

    #[test]
    fn test_shutdown_in_reverse_load_order() {
        let log = Arc::default();
        let host = PluginHost::new(RegistryConfig::default());
        host.load(&plugin("a", &log, false)).unwrap();
        host.load(&plugin("b", &log, false)).unwrap();
        assert_eq!(host.plugins(), vec!["a", "b"]);

        let results = host.shutdown();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].plugin, "b");
        assert_eq!(
            *log.lock().unwrap(),
            vec!["a up", "b up", "b down", "a down"]
        );
        assert!(host.plugins().is_empty());
    }

    #[test]
    fn test_failed_plugin_not_kept() {
        let log = Arc::default();
        let host = PluginHost::new(RegistryConfig::default());
        host.load(&plugin("good", &log, false)).unwrap();

        let err = host.load(&plugin("bad", &log, true)).unwrap_err();
        assert!(matches!(err, HookError::CallbackFailure { .. }));
        assert_eq!(host.plugins(), vec!["good"]);

        host.shutdown();
        assert_eq!(
            *log.lock().unwrap(),
            vec!["good up", "bad up", "good down"]
        );
    }

    #[test]
    fn test_concurrent_loads_are_serialized() {
        let log = Arc::default();
        let host = Arc::new(PluginHost::new(RegistryConfig::default()));
        let names = ["p0", "p1", "p2", "p3"];

        std::thread::scope(|s| {
            for name in names {
                let host = host.clone();
                let log = &log;
                s.spawn(move || host.load(&plugin(name, log, false)).unwrap());
            }
        });

        assert_eq!(host.plugins().len(), 4);
        let entries = log.lock().unwrap().clone();
        assert_eq!(entries.len(), 4);
        assert!(entries.iter().all(|e| e.ends_with(" up")));
    }
}
