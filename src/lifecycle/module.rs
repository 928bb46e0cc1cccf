//! The module side of the loader contract.

use crate::error::HookResult;
use crate::registry::{CallbackResult, HookHandle, HookRegistry, HookSpec};

/// An independently built unit that contributes lifecycle hooks.
///
/// The loader calls [`HookModule::register`] once, in loader order, before
/// the startup pass.
pub trait HookModule {
    fn name(&self) -> &str;

    fn register(&self, scope: &mut ModuleScope<'_>) -> HookResult<()>;
}

/// Registration view handed to a module.
///
/// Every hook registered through the scope is tagged with the module name.
pub struct ModuleScope<'a> {
    module: &'a str,
    registry: &'a mut HookRegistry,
    handles: Vec<HookHandle>,
}

impl<'a> ModuleScope<'a> {
    pub fn new(module: &'a str, registry: &'a mut HookRegistry) -> Self {
        Self {
            module,
            registry,
            handles: Vec::new(),
        }
    }

    pub fn register(&mut self, spec: HookSpec) -> HookResult<HookHandle> {
        let handle = self.registry.register(spec.module(self.module))?;
        self.handles.push(handle);
        Ok(handle)
    }

    pub fn on_startup<F>(&mut self, name: &str, callback: F) -> HookResult<HookHandle>
    where
        F: FnOnce() -> CallbackResult + Send + 'static,
    {
        self.register(HookSpec::startup().name(name).callback(callback))
    }

    pub fn on_cleanup<F>(&mut self, name: &str, callback: F) -> HookResult<HookHandle>
    where
        F: FnOnce() -> CallbackResult + Send + 'static,
    {
        self.register(HookSpec::cleanup().name(name).callback(callback))
    }

    /// Startup hook plus the cleanup hook that releases it.
    pub fn acquire<S, C>(&mut self, name: &str, startup: S, cleanup: C) -> HookResult<HookHandle>
    where
        S: FnOnce() -> CallbackResult + Send + 'static,
        C: FnOnce() -> CallbackResult + Send + 'static,
    {
        let owner = self.on_startup(name, startup)?;
        self.register(
            HookSpec::releasing(owner)
                .name(format!("{name}:release"))
                .callback(cleanup),
        )?;
        Ok(owner)
    }

    pub fn module(&self) -> &str {
        self.module
    }

    /// Handles registered through this scope so far.
    pub fn handles(&self) -> &[HookHandle] {
        &self.handles
    }
}

/// A module defined by a closure.
pub struct ModuleFn<F> {
    name: String,
    register: F,
}

impl<F> ModuleFn<F>
where
    F: Fn(&mut ModuleScope<'_>) -> HookResult<()>,
{
    pub fn new(name: impl Into<String>, register: F) -> Self {
        Self {
            name: name.into(),
            register,
        }
    }
}

impl<F> HookModule for ModuleFn<F>
where
    F: Fn(&mut ModuleScope<'_>) -> HookResult<()>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn register(&self, scope: &mut ModuleScope<'_>) -> HookResult<()> {
        (self.register)(scope)
    }
}
