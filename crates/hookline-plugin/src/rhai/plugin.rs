//! Plugins implemented as Rhai scripts.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use hookline_core::Payload;
use rhai::{AST, Dynamic, Engine, Scope};
use tracing::{debug, warn};

use super::runtime::{array_to_payload, compile, payload_to_array};
use crate::config::PluginManifest;
use crate::handler::{HookContext, HookHandler, PluginObject};
use crate::types::{PluginError, PluginResult};

/// Name of the function a script must define to handle hooks.
pub const HOOK_FN: &str = "hook";

/// A loaded Rhai plugin.
///
/// The script satisfies the handler contract when it defines
/// `fn hook(name, io)`, receiving the hook name and the payload array and
/// returning the payload for the next handler.
pub struct ScriptPlugin {
    manifest: PluginManifest,
    engine: Arc<Engine>,
    ast: AST,
    manifest_applied: AtomicBool,
}

impl ScriptPlugin {
    /// Compile the manifest's entry script from `plugin_dir`.
    pub fn load(engine: Arc<Engine>, manifest: PluginManifest, plugin_dir: &Path) -> PluginResult<Self> {
        let entry = plugin_dir.join(&manifest.entry);
        let ast = compile(&engine, &manifest.name, &entry)?;
        Ok(Self::from_ast(engine, manifest, ast))
    }

    /// Build a plugin from source text.
    pub fn from_source(engine: Arc<Engine>, manifest: PluginManifest, source: &str) -> PluginResult<Self> {
        let ast = engine.compile(source).map_err(|e| PluginError::LoadError {
            name: manifest.name.clone(),
            message: e.to_string(),
        })?;
        Ok(Self::from_ast(engine, manifest, ast))
    }

    fn from_ast(engine: Arc<Engine>, manifest: PluginManifest, ast: AST) -> Self {
        Self {
            manifest,
            engine,
            ast,
            manifest_applied: AtomicBool::new(false),
        }
    }

    /// The plugin's manifest.
    pub fn manifest(&self) -> &PluginManifest {
        &self.manifest
    }

    /// Check if the script defines the hook handler function.
    pub fn implements_hook(&self) -> bool {
        self.ast
            .iter_functions()
            .any(|f| f.name == HOOK_FN && f.params.len() == 2)
    }

    /// Install the manifest's hooks and subscriptions. Only the first call
    /// has an effect; later init broadcasts leave subscriptions alone.
    fn apply_manifest(&self, cx: &HookContext<'_>) {
        if self.manifest_applied.swap(true, Ordering::SeqCst) {
            debug!(plugin = %self.manifest.name, "Manifest already applied");
            return;
        }
        let registry = cx.registry();
        for hook in &self.manifest.hooks {
            if !registry.register_hook(hook.clone()) {
                debug!(plugin = %self.manifest.name, hook = %hook.name, "Hook already installed");
            }
        }
        for subscription in &self.manifest.subscribe {
            cx.subscribe_self(subscription.hook.as_str(), subscription.priority);
        }
    }

    fn call_script(&self, hook: &str, io: Payload) -> Payload {
        let args = (hook.to_string(), payload_to_array(&io));
        let result = self
            .engine
            .call_fn::<Dynamic>(&mut Scope::new(), &self.ast, HOOK_FN, args);

        match result {
            Ok(value) => match value.into_array() {
                Ok(array) => array_to_payload(&array),
                Err(type_name) => {
                    warn!(
                        plugin = %self.manifest.name,
                        hook,
                        returned = type_name,
                        "Script hook must return an array; keeping payload"
                    );
                    io
                }
            },
            Err(e) => {
                warn!(plugin = %self.manifest.name, hook, error = %e, "Script hook failed; keeping payload");
                io
            }
        }
    }
}

impl PluginObject for ScriptPlugin {
    fn name(&self) -> &str {
        &self.manifest.name
    }

    fn hook_handler(self: Arc<Self>) -> Option<Arc<dyn HookHandler>> {
        if self.implements_hook() {
            Some(self)
        } else {
            None
        }
    }
}

impl HookHandler for ScriptPlugin {
    fn handle(&self, cx: &HookContext<'_>, io: Payload) -> Payload {
        if cx.is_init() {
            self.apply_manifest(cx);
        }
        self.call_script(cx.hook_name(), io)
    }
}
