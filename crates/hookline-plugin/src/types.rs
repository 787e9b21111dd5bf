//! Core types for the plugin system.

use std::borrow::Borrow;
use std::fmt;
use std::path::PathBuf;

use compact_str::CompactString;
use hookline_core::CoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for plugin operations.
pub type PluginResult<T> = Result<T, PluginError>;

/// Errors that can occur in the plugin system.
///
/// None of these abort dispatch: the registry logs them at the point of
/// detection and degrades to a pass-through or no-op.
#[derive(Debug, Error)]
pub enum PluginError {
    /// Plugin file not found.
    #[error("Plugin not found: {path}")]
    NotFound { path: PathBuf },

    /// Failed to load plugin.
    #[error("Failed to load plugin '{name}': {message}")]
    LoadError { name: String, message: String },

    /// Lookup of a hook that was never registered.
    #[error("Hook '{name}' is not registered")]
    UnknownHook { name: String },

    /// Invalid plugin configuration or manifest.
    #[error("Invalid plugin configuration: {message}")]
    ConfigError { message: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Value conversion error.
    #[error("Value error: {0}")]
    Value(#[from] CoreError),
}

/// Stable identifier of a discovered plugin.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginId(CompactString);

impl PluginId {
    /// Create a new plugin identifier.
    pub fn new(id: impl Into<CompactString>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for PluginId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PluginId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for PluginId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}
