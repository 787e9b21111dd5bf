//! Hook registry and plugin system for hookline.
//!
//! Plugins discovered at runtime register and respond to named, ordered
//! extension points ("hooks"), exchanging [`Variant`](hookline_core::Variant)
//! payloads without compile-time knowledge of each other.
//!
//! # Architecture
//!
//! - [`HookCatalog`]: registered hook contracts. A hook is either broadcast
//!   to every loaded plugin or chained through its subscribers.
//! - [`SubscriptionQueue`]: priority-ordered subscriptions per hook.
//! - [`PluginTable`]: loaded plugins in load order, unique by identifier.
//! - [`Registry`]: composes the three and runs discovery and dispatch.
//!
//! # Example
//!
//! ```ignore
//! use hookline_core::Variant;
//! use hookline_plugin::{FnPlugin, HookDescription, Registry, StaticSource};
//!
//! let registry = Registry::default();
//! registry.register_hook(HookDescription::new("Greeting", "Build a greeting"));
//!
//! let greeter = FnPlugin::instance("greeter", |cx, io| {
//!     if cx.is_init() {
//!         cx.subscribe_self("Greeting", 10);
//!     }
//!     io
//! });
//! registry.add_source(StaticSource::new("builtin").with_instance("greeter", greeter));
//! registry.scan_for_plugins();
//!
//! let out = registry.invoke_hook("Greeting", vec![Variant::string("hello")]);
//! ```

mod config;
mod discovery;
mod handler;
mod hooks;
mod queue;
pub mod rhai;
mod registry;
mod table;
mod types;

pub use crate::rhai::{ScriptPlugin, ScriptSource};
pub use config::{MANIFEST_FILE, ManifestSubscription, PluginConfig, PluginManifest, ScriptLimits};
pub use discovery::{Candidate, CandidateOutcome, DiscoverySource, StaticSource};
pub use handler::{FnPlugin, HandlerRef, HookContext, HookHandler, Instance, PluginObject};
pub use hooks::{HookCatalog, HookDescription};
pub use queue::{Subscription, SubscriptionQueue};
pub use registry::Registry;
pub use table::{PluginEntry, PluginTable};
pub use types::{PluginError, PluginId, PluginResult};
