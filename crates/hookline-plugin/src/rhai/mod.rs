//! Rhai plugin runtime.
//!
//! Script plugins live in their own directory with a `plugin.toml`
//! manifest and an entry script defining `fn hook(name, io)`.

mod plugin;
mod runtime;
mod source;

pub use plugin::{HOOK_FN, ScriptPlugin};
pub use runtime::{array_to_payload, build_engine, dynamic_to_variant, payload_to_array, variant_to_dynamic};
pub use source::ScriptSource;
