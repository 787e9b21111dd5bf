//! Hook contracts and the catalog that owns them.
//!
//! A hook is a named extension point. Its description says whether it is
//! broadcast to every loaded plugin or chained through the handlers
//! subscribed to it, and documents each payload slot. Slot descriptions are
//! documentation only; payloads are never checked against them.

use std::fmt;

use compact_str::CompactString;
use indexmap::IndexMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Description of a single hook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookDescription {
    /// Globally unique hook name.
    pub name: CompactString,

    /// What the hook intends to accomplish.
    #[serde(default)]
    pub description: String,

    /// Broadcast hooks skip prioritization and run on every loaded plugin.
    #[serde(default)]
    pub always_invoke: bool,

    /// One entry per payload slot, e.g.
    /// `"ButtonList {Array<ObjectRef>} - buttons added to the menu"`.
    #[serde(default)]
    pub io: Vec<String>,
}

impl HookDescription {
    /// Create a chained hook description.
    pub fn new(name: impl Into<CompactString>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            always_invoke: false,
            io: Vec::new(),
        }
    }

    /// Mark the hook as broadcast.
    pub fn always_invoke(mut self) -> Self {
        self.always_invoke = true;
        self
    }

    /// Document the payload slots.
    pub fn with_io<I, S>(mut self, io: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.io = io.into_iter().map(Into::into).collect();
        self
    }

    /// Render name, description and slot documentation as one block.
    pub fn full_description(&self) -> String {
        let slots = self.io.iter().map(|slot| format!("\n - {slot}")).join("");
        format!("{} : {}\nHookIO:{slots}", self.name, self.description)
    }
}

impl fmt::Display for HookDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_description())
    }
}

/// The set of registered hook contracts, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct HookCatalog {
    hooks: IndexMap<CompactString, HookDescription>,
}

impl HookCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a description if its name is not taken yet.
    ///
    /// Returns `false` on a duplicate name and keeps the prior registration.
    pub fn register(&mut self, description: HookDescription) -> bool {
        if self.hooks.contains_key(description.name.as_str()) {
            return false;
        }
        self.hooks.insert(description.name.clone(), description);
        true
    }

    /// Look up a hook by name.
    pub fn describe(&self, name: &str) -> Option<&HookDescription> {
        self.hooks.get(name)
    }

    /// Check if a hook is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.hooks.contains_key(name)
    }

    /// All registered descriptions.
    pub fn list(&self) -> impl Iterator<Item = &HookDescription> {
        self.hooks.values()
    }

    /// Number of registered hooks.
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Check if no hooks are registered.
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_rejects_duplicates() {
        let mut catalog = HookCatalog::new();
        assert!(catalog.register(HookDescription::new("Foo", "first")));
        assert!(!catalog.register(HookDescription::new("Foo", "second")));
        assert!(catalog.register(HookDescription::new("Bar", "")));

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.describe("Foo").unwrap().description, "first");
        assert!(catalog.describe("Baz").is_none());
    }

    #[test]
    fn test_full_description() {
        let hook = HookDescription::new("MainMenu", "Populate the main menu").with_io([
            "ButtonList {Array<ObjectRef>} - buttons to add",
            "LaunchMapping {Array<String>} - input actions that open the menu",
        ]);

        assert_eq!(
            hook.full_description(),
            "MainMenu : Populate the main menu\nHookIO:\n \
             - ButtonList {Array<ObjectRef>} - buttons to add\n \
             - LaunchMapping {Array<String>} - input actions that open the menu"
        );
        assert_eq!(hook.to_string(), hook.full_description());
    }

    #[test]
    fn test_description_defaults_from_toml() {
        let hook: HookDescription = toml::from_str(r#"name = "Tick""#).unwrap();
        assert_eq!(hook.name, "Tick");
        assert!(!hook.always_invoke);
        assert!(hook.io.is_empty());
    }
}
