//! The hook handler contract and capability checking.
//!
//! Discovery sources produce [`PluginObject`]s. An object is only trusted as
//! a plugin or a subscriber after it passes the capability check, i.e. it
//! hands back a [`HookHandler`]. The check runs once, at discovery or
//! subscribe time; the resulting [`HandlerRef`] is what dispatch calls.

use std::fmt;
use std::sync::Arc;

use compact_str::CompactString;
use hookline_core::Payload;

use crate::registry::Registry;

/// A plugin instance as produced by a discovery source.
pub type Instance = Arc<dyn PluginObject>;

/// Something a discovery source can instantiate.
pub trait PluginObject: Send + Sync + 'static {
    /// Human-readable name, used in logs and listings.
    fn name(&self) -> &str;

    /// Capability check: return the hook handler this object implements,
    /// or `None` if it does not satisfy the handler contract.
    fn hook_handler(self: Arc<Self>) -> Option<Arc<dyn HookHandler>>;
}

/// The handler contract every plugin must implement.
pub trait HookHandler: Send + Sync {
    /// Handle one hook call.
    ///
    /// Receives the current payload and returns the payload for the next
    /// handler in the chain.
    fn handle(&self, cx: &HookContext<'_>, io: Payload) -> Payload;
}

/// A capability-checked handler together with the instance it came from.
#[derive(Clone)]
pub struct HandlerRef {
    instance: Instance,
    handler: Arc<dyn HookHandler>,
}

impl HandlerRef {
    /// Run the capability check on an instance.
    pub fn check(instance: &Instance) -> Option<Self> {
        let handler = Arc::clone(instance).hook_handler()?;
        Some(Self {
            instance: Arc::clone(instance),
            handler,
        })
    }

    /// The instance this handler belongs to.
    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    /// Name of the owning instance.
    pub fn name(&self) -> &str {
        self.instance.name()
    }

    pub(crate) fn call(&self, registry: &Registry, hook: &str, io: Payload) -> Payload {
        let cx = HookContext {
            registry,
            hook,
            instance: &self.instance,
        };
        self.handler.handle(&cx, io)
    }
}

impl fmt::Debug for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRef")
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}

/// Context handed to a handler for the duration of one call.
///
/// Handlers may call back into the registry from here, including invoking
/// the hook they are currently handling.
pub struct HookContext<'a> {
    registry: &'a Registry,
    hook: &'a str,
    instance: &'a Instance,
}

impl<'a> HookContext<'a> {
    /// The registry dispatching this call.
    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    /// Name of the hook being invoked.
    pub fn hook_name(&self) -> &'a str {
        self.hook
    }

    /// The instance whose handler is running.
    pub fn instance(&self) -> &'a Instance {
        self.instance
    }

    /// Check if this call is the registry's init broadcast.
    pub fn is_init(&self) -> bool {
        self.hook == self.registry.init_hook()
    }

    /// Subscribe the running instance to a hook.
    pub fn subscribe_self(&self, hook: impl Into<CompactString>, priority: i32) -> bool {
        self.registry.subscribe(hook, priority, self.instance)
    }
}

/// A plugin backed by a closure.
///
/// Handy for hosts that link plugins statically and for tests.
pub struct FnPlugin<F> {
    name: CompactString,
    handler: F,
}

impl<F> FnPlugin<F>
where
    F: Fn(&HookContext<'_>, Payload) -> Payload + Send + Sync + 'static,
{
    /// Wrap a closure as a plugin.
    pub fn new(name: impl Into<CompactString>, handler: F) -> Self {
        Self {
            name: name.into(),
            handler,
        }
    }

    /// Wrap a closure as a ready-to-use instance.
    pub fn instance(name: impl Into<CompactString>, handler: F) -> Instance {
        Arc::new(Self::new(name, handler))
    }
}

impl<F> HookHandler for FnPlugin<F>
where
    F: Fn(&HookContext<'_>, Payload) -> Payload + Send + Sync + 'static,
{
    fn handle(&self, cx: &HookContext<'_>, io: Payload) -> Payload {
        (self.handler)(cx, io)
    }
}

impl<F> PluginObject for FnPlugin<F>
where
    F: Fn(&HookContext<'_>, Payload) -> Payload + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn hook_handler(self: Arc<Self>) -> Option<Arc<dyn HookHandler>> {
        Some(self)
    }
}
