//! Plugin configuration and manifests.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::hooks::HookDescription;
use crate::types::{PluginError, PluginResult};

/// File name of a plugin manifest inside its plugin directory.
pub const MANIFEST_FILE: &str = "plugin.toml";

/// Global plugin system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginConfig {
    /// Directory where script plugins are stored, one subdirectory each.
    pub plugin_dir: PathBuf,

    /// Whether to load script plugins at all.
    pub enabled: bool,

    /// Plugin names to skip during discovery.
    pub disabled_plugins: HashSet<String>,

    /// Only plugins whose name starts with this prefix are considered.
    pub name_prefix: Option<String>,

    /// Resource limits applied to script engines.
    pub limits: ScriptLimits,
}

impl Default for PluginConfig {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hookline");

        Self {
            plugin_dir: config_dir.join("plugins"),
            enabled: true,
            disabled_plugins: HashSet::new(),
            name_prefix: None,
            limits: ScriptLimits::default(),
        }
    }
}

impl PluginConfig {
    /// Load configuration from a TOML file. Missing fields use defaults.
    pub fn load(path: impl AsRef<Path>) -> PluginResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        toml::from_str(&content).map_err(|e| PluginError::ConfigError {
            message: format!("{}: {e}", path.as_ref().display()),
        })
    }

    /// Create a new config with a custom plugin directory.
    pub fn with_plugin_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.plugin_dir = dir.into();
        self
    }

    /// Only accept plugins whose name starts with `prefix`.
    pub fn with_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name_prefix = Some(prefix.into());
        self
    }

    /// Disable a specific plugin.
    pub fn disable_plugin(mut self, name: impl Into<String>) -> Self {
        self.disabled_plugins.insert(name.into());
        self
    }

    /// Check if a plugin is disabled.
    pub fn is_disabled(&self, name: &str) -> bool {
        self.disabled_plugins.contains(name)
    }

    /// Check if discovery should consider a plugin with this name.
    pub fn accepts(&self, name: &str) -> bool {
        self.enabled
            && !self.is_disabled(name)
            && self
                .name_prefix
                .as_deref()
                .is_none_or(|prefix| name.starts_with(prefix))
    }
}

/// Limits applied to every script engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptLimits {
    /// Maximum operations per script call (0 = unlimited).
    pub max_operations: u64,

    /// Maximum function call nesting.
    pub max_call_levels: usize,

    /// Maximum expression nesting depth.
    pub max_expr_depth: usize,

    /// Maximum string length in bytes.
    pub max_string_size: usize,

    /// Maximum array length.
    pub max_array_size: usize,

    /// Maximum object map size.
    pub max_map_size: usize,
}

impl Default for ScriptLimits {
    fn default() -> Self {
        Self {
            max_operations: 1_000_000,
            max_call_levels: 64,
            max_expr_depth: 64,
            max_string_size: 1024 * 1024,
            max_array_size: 10_000,
            max_map_size: 10_000,
        }
    }
}

/// Contents of a plugin's `plugin.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginManifest {
    /// Plugin name (unique identifier).
    pub name: String,

    /// Plugin version.
    #[serde(default = "default_version")]
    pub version: String,

    /// Human-readable description.
    #[serde(default)]
    pub description: String,

    /// Plugin author.
    #[serde(default)]
    pub author: String,

    /// Entry script (relative to the plugin directory).
    #[serde(default = "default_entry")]
    pub entry: String,

    /// Hooks this plugin installs when it is initialized.
    #[serde(default)]
    pub hooks: Vec<HookDescription>,

    /// Hooks this plugin subscribes to when it is initialized.
    #[serde(default)]
    pub subscribe: Vec<ManifestSubscription>,
}

/// A subscription declared in a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestSubscription {
    /// Hook to subscribe to.
    pub hook: String,

    /// Priority, higher runs first.
    #[serde(default)]
    pub priority: i32,
}

fn default_version() -> String {
    "0.1.0".to_string()
}

fn default_entry() -> String {
    "main.rhai".to_string()
}

impl PluginManifest {
    /// Read the manifest inside a plugin directory.
    pub fn load(plugin_dir: &Path) -> PluginResult<Self> {
        let path = plugin_dir.join(MANIFEST_FILE);
        if !path.is_file() {
            return Err(PluginError::NotFound { path });
        }
        let content = std::fs::read_to_string(&path)?;
        Self::parse(&content).map_err(|e| match e {
            PluginError::ConfigError { message } => PluginError::ConfigError {
                message: format!("{}: {message}", path.display()),
            },
            other => other,
        })
    }

    /// Parse manifest text.
    pub fn parse(content: &str) -> PluginResult<Self> {
        let manifest: Self = toml::from_str(content).map_err(|e| PluginError::ConfigError {
            message: e.to_string(),
        })?;
        if manifest.name.trim().is_empty() {
            return Err(PluginError::ConfigError {
                message: "plugin name cannot be empty".to_string(),
            });
        }
        Ok(manifest)
    }
}
