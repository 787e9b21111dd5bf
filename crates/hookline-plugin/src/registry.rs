//! The hook registry.
//!
//! [`Registry`] owns the hook catalog, the subscription queue and the
//! plugin table behind one lock. The lock is held only while reading or
//! mutating that state; handlers always run with it released, against a
//! snapshot of the handlers to call. A handler may therefore subscribe,
//! register hooks, scan for plugins or invoke hooks (the current one
//! included) without deadlocking or disturbing the dispatch in progress.

use std::sync::{Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use compact_str::CompactString;
use hookline_core::{Payload, RegistryConfig, Variant};
use tracing::{debug, info, warn};

use crate::discovery::{Candidate, CandidateOutcome, DiscoverySource};
use crate::handler::{HandlerRef, Instance};
use crate::hooks::{HookCatalog, HookDescription};
use crate::queue::{Subscription, SubscriptionQueue};
use crate::table::{PluginEntry, PluginTable};
use crate::types::{PluginError, PluginId, PluginResult};

#[derive(Default)]
struct RegistryState {
    catalog: HookCatalog,
    subscriptions: SubscriptionQueue,
    plugins: PluginTable,
}

/// Registry of hooks, subscriptions and loaded plugins.
pub struct Registry {
    config: RegistryConfig,
    state: RwLock<RegistryState>,
    sources: Mutex<Vec<Box<dyn DiscoverySource>>>,
}

impl Registry {
    /// Create a registry with the reserved init hook installed.
    pub fn new(config: RegistryConfig) -> Self {
        let mut state = RegistryState::default();
        state.catalog.register(
            HookDescription::new(config.init_hook.clone(), config.init_description.clone())
                .always_invoke(),
        );

        Self {
            config,
            state: RwLock::new(state),
            sources: Mutex::new(Vec::new()),
        }
    }

    /// Get the registry configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Name of the broadcast hook fired on every newly loaded plugin.
    pub fn init_hook(&self) -> &str {
        &self.config.init_hook
    }

    fn read(&self) -> RwLockReadGuard<'_, RegistryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    // ==================== Hooks ====================

    /// Install a new hook. Returns `false` if the name is already taken.
    pub fn register_hook(&self, description: HookDescription) -> bool {
        let name = description.name.clone();
        let inserted = self.write().catalog.register(description);
        if inserted {
            debug!(hook = %name, "Hook registered");
        } else {
            debug!(hook = %name, "Ignoring duplicate hook registration");
        }
        inserted
    }

    /// All installed hooks.
    pub fn list_hooks(&self) -> Vec<HookDescription> {
        self.read().catalog.list().cloned().collect()
    }

    /// Description of a single hook.
    pub fn get_hook_description(&self, name: &str) -> PluginResult<HookDescription> {
        self.read()
            .catalog
            .describe(name)
            .cloned()
            .ok_or_else(|| PluginError::UnknownHook {
                name: name.to_string(),
            })
    }

    // ==================== Subscriptions ====================

    /// Subscribe an instance to a hook at a priority (higher runs first).
    ///
    /// Instances failing the capability check are not subscribed and
    /// `false` is returned.
    pub fn subscribe(
        &self,
        hook: impl Into<CompactString>,
        priority: i32,
        instance: &Instance,
    ) -> bool {
        let hook = hook.into();
        let Some(handler) = HandlerRef::check(instance) else {
            warn!(
                hook = %hook,
                plugin = instance.name(),
                "Refusing subscription from object without a hook handler"
            );
            return false;
        };
        self.subscribe_handler(hook, priority, handler);
        true
    }

    /// Subscribe an already checked handler.
    pub fn subscribe_handler(&self, hook: impl Into<CompactString>, priority: i32, handler: HandlerRef) {
        let hook = hook.into();
        let mut state = self.write();
        if !state.catalog.contains(&hook) {
            debug!(hook = %hook, "Subscribing to a hook that is not registered yet");
        }
        debug!(hook = %hook, priority, plugin = handler.name(), "Handler subscribed");
        state.subscriptions.subscribe(hook, priority, handler);
    }

    /// Ordered snapshot of the subscriptions for one hook.
    pub fn subscriptions(&self, hook: &str) -> Vec<Subscription> {
        self.read().subscriptions.snapshot(hook)
    }

    // ==================== Dispatch ====================

    /// Invoke a hook, threading the payload through each handler in turn.
    ///
    /// Broadcast hooks call every loaded plugin in load order; chained hooks
    /// call their subscribers highest priority first. Each handler's result
    /// is the next handler's input and the last result is returned. Unknown
    /// hooks return the payload unchanged.
    pub fn invoke_hook(&self, hook: &str, payload: Payload) -> Payload {
        let handlers = {
            let state = self.read();
            let Some(description) = state.catalog.describe(hook) else {
                warn!(hook, "Ignoring unregistered hook");
                return payload;
            };
            if description.always_invoke {
                state.plugins.handlers()
            } else {
                state.subscriptions.drain_in_order(hook)
            }
        };

        debug!(hook, handlers = handlers.len(), "Invoking hook");
        handlers
            .iter()
            .fold(payload, |io, handler| handler.call(self, hook, io))
    }

    /// Invoke a hook with a payload given as a JSON array.
    ///
    /// The payload is validated before any handler runs; a value with no
    /// variant form is an error and nothing is invoked.
    pub fn invoke_hook_json(&self, hook: &str, payload: &serde_json::Value) -> PluginResult<Payload> {
        let payload = Variant::payload_from_json(payload)?;
        Ok(self.invoke_hook(hook, payload))
    }

    // ==================== Plugins ====================

    /// Instances of every loaded plugin, in load order.
    pub fn list_loaded_plugins(&self) -> Vec<Instance> {
        self.read()
            .plugins
            .iter()
            .map(|entry| entry.instance().clone())
            .collect()
    }

    /// Table entries of every loaded plugin, in load order.
    pub fn loaded_plugins(&self) -> Vec<PluginEntry> {
        self.read().plugins.iter().cloned().collect()
    }

    /// Check if a plugin identifier is loaded.
    pub fn is_loaded(&self, id: &str) -> bool {
        self.read().plugins.contains(id)
    }

    /// Number of loaded plugins.
    pub fn plugin_count(&self) -> usize {
        self.read().plugins.len()
    }

    /// Add a discovery source consulted by [`scan_for_plugins`](Self::scan_for_plugins).
    pub fn add_source(&self, source: impl DiscoverySource + 'static) {
        self.sources
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Box::new(source));
    }

    /// Ask every source for candidates and load the new ones.
    ///
    /// Safe to call repeatedly: loaded identifiers are skipped without being
    /// instantiated or re-initialized. Returns the identifiers loaded by this
    /// scan. A failing source is logged and skipped.
    pub fn scan_for_plugins(&self) -> Vec<PluginId> {
        let candidates: Vec<Candidate> = {
            let mut sources = self.sources.lock().unwrap_or_else(PoisonError::into_inner);
            sources
                .iter_mut()
                .flat_map(|source| match source.discover() {
                    Ok(candidates) => {
                        debug!(source = source.name(), count = candidates.len(), "Discovered candidates");
                        candidates
                    }
                    Err(e) => {
                        warn!(source = source.name(), error = %e, "Discovery source failed");
                        Vec::new()
                    }
                })
                .collect()
        };

        candidates
            .into_iter()
            .filter_map(|candidate| {
                let id = candidate.identifier().clone();
                (self.consider_candidate(candidate) == CandidateOutcome::Loaded).then_some(id)
            })
            .collect()
    }

    /// Offer a single candidate to the registry.
    ///
    /// A new identifier is instantiated and capability-checked. On success
    /// the plugin enters the table first and then receives the init hook
    /// exactly once, so anything its init handler triggers already sees it.
    pub fn consider_candidate(&self, candidate: Candidate) -> CandidateOutcome {
        let id = candidate.identifier().clone();
        if self.is_loaded(id.as_str()) {
            return CandidateOutcome::AlreadyLoaded;
        }

        let instance = match candidate.instantiate() {
            Ok(instance) => instance,
            Err(e) => {
                warn!(plugin = %id, error = %e, "Failed to instantiate plugin");
                return CandidateOutcome::Failed;
            }
        };

        let Some(handler) = HandlerRef::check(&instance) else {
            warn!(plugin = %id, "Plugin does not implement the hook handler contract");
            return CandidateOutcome::Rejected;
        };

        if !self.write().plugins.insert(PluginEntry::new(id.clone(), handler.clone())) {
            return CandidateOutcome::AlreadyLoaded;
        }
        info!(plugin = %id, name = instance.name(), "Plugin loaded");

        // The init result is discarded.
        handler.call(self, self.init_hook(), Payload::new());
        CandidateOutcome::Loaded
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::FnPlugin;

    #[test]
    fn test_init_hook_installed() {
        let registry = Registry::default();
        let init = registry.get_hook_description("Init").unwrap();
        assert!(init.always_invoke);
        assert!(!registry.register_hook(HookDescription::new("Init", "again")));
    }

    #[test]
    fn test_unknown_hook_description() {
        let registry = Registry::default();
        assert!(matches!(
            registry.get_hook_description("Missing"),
            Err(PluginError::UnknownHook { .. })
        ));
    }

    #[test]
    fn test_chained_hook_folds_payload() {
        let registry = Registry::default();
        registry.register_hook(HookDescription::new("Add", "adds to slot 0"));

        let add = |n: i32| {
            FnPlugin::instance(format!("add{n}"), move |_, mut io: Payload| {
                let current = io[0].as_integer();
                io[0].set_integer(current + n);
                io
            })
        };
        assert!(registry.subscribe("Add", 1, &add(1)));
        assert!(registry.subscribe("Add", 2, &add(10)));

        let out = registry.invoke_hook("Add", vec![Variant::integer(0)]);
        assert_eq!(out, vec![Variant::integer(11)]);
    }

    #[test]
    fn test_invoke_hook_json() {
        let registry = Registry::default();
        registry.register_hook(HookDescription::new("Echo", "returns its input"));

        let out = registry
            .invoke_hook_json("Echo", &serde_json::json!([1, null, "a"]))
            .unwrap();
        assert_eq!(
            out,
            vec![Variant::integer(1), Variant::None, Variant::string("a")]
        );

        assert!(matches!(
            registry.invoke_hook_json("Echo", &serde_json::json!({"a": 1})),
            Err(PluginError::Value(_))
        ));
        assert!(matches!(
            registry.invoke_hook_json("Echo", &serde_json::json!([{"a": 1}])),
            Err(PluginError::Value(_))
        ));
    }

    #[test]
    fn test_custom_init_hook_name() {
        let config = RegistryConfig::builder().init_hook("Boot").build().unwrap();
        let registry = Registry::new(config);
        assert_eq!(registry.init_hook(), "Boot");
        assert!(registry.get_hook_description("Boot").unwrap().always_invoke);
        assert!(registry.get_hook_description("Init").is_err());
    }
}
