//! Table of loaded plugins.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::handler::{HandlerRef, Instance};
use crate::types::PluginId;

/// A loaded plugin.
#[derive(Debug, Clone)]
pub struct PluginEntry {
    /// Stable identifier reported by the discovery source.
    pub id: PluginId,

    /// When the plugin entered the table.
    pub loaded_at: DateTime<Utc>,

    handler: HandlerRef,
}

impl PluginEntry {
    /// Create an entry for a capability-checked handler.
    pub fn new(id: PluginId, handler: HandlerRef) -> Self {
        Self {
            id,
            loaded_at: Utc::now(),
            handler,
        }
    }

    /// The plugin instance.
    pub fn instance(&self) -> &Instance {
        self.handler.instance()
    }

    /// The plugin's hook handler.
    pub fn handler(&self) -> &HandlerRef {
        &self.handler
    }
}

/// Loaded plugins in load order, unique by identifier.
#[derive(Debug, Default, Clone)]
pub struct PluginTable {
    entries: IndexMap<PluginId, PluginEntry>,
}

impl PluginTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if an identifier is loaded.
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Insert an entry. Returns `false` and keeps the existing entry if the
    /// identifier is already present.
    pub fn insert(&mut self, entry: PluginEntry) -> bool {
        if self.entries.contains_key(&entry.id) {
            return false;
        }
        self.entries.insert(entry.id.clone(), entry);
        true
    }

    /// Look up an entry.
    pub fn get(&self, id: &str) -> Option<&PluginEntry> {
        self.entries.get(id)
    }

    /// Entries in load order.
    pub fn iter(&self) -> impl Iterator<Item = &PluginEntry> {
        self.entries.values()
    }

    /// Handlers of every loaded plugin, in load order.
    pub fn handlers(&self) -> Vec<HandlerRef> {
        self.entries.values().map(|e| e.handler.clone()).collect()
    }

    /// Number of loaded plugins.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no plugins are loaded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
