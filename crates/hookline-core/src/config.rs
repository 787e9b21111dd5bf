//! Registry configuration types.

use compact_str::CompactString;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Name of the reserved broadcast hook fired once per loaded plugin.
pub const INIT_HOOK: &str = "Init";

/// Default description of the reserved init hook.
pub const DEFAULT_INIT_DESCRIPTION: &str =
    "Bootstrap entry point. Invoked once on every plugin as it is loaded.";

/// Configuration for a hook registry.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct RegistryConfig {
    /// Name of the broadcast hook installed at construction and fired on
    /// every newly loaded plugin.
    #[builder(default = "CompactString::new(INIT_HOOK)")]
    #[serde(default = "default_init_hook")]
    pub init_hook: CompactString,

    /// Description attached to the init hook.
    #[builder(default = "DEFAULT_INIT_DESCRIPTION.to_string()")]
    #[serde(default = "default_init_description")]
    pub init_description: String,
}

fn default_init_hook() -> CompactString {
    CompactString::new(INIT_HOOK)
}

fn default_init_description() -> String {
    DEFAULT_INIT_DESCRIPTION.to_string()
}

impl RegistryConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref name) = self.init_hook {
            if name.trim().is_empty() {
                return Err("Init hook name cannot be empty".to_string());
            }
        }
        Ok(())
    }
}

impl RegistryConfig {
    /// Create a new registry config builder.
    pub fn builder() -> RegistryConfigBuilder {
        RegistryConfigBuilder::default()
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            init_hook: default_init_hook(),
            init_description: default_init_description(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = RegistryConfig::default();
        assert_eq!(config.init_hook, "Init");
        assert_eq!(config.init_description, DEFAULT_INIT_DESCRIPTION);
    }

    #[test]
    fn test_config_builder() {
        let config = RegistryConfig::builder()
            .init_hook("Bootstrap")
            .build()
            .unwrap();
        assert_eq!(config.init_hook, "Bootstrap");
        assert_eq!(config.init_description, DEFAULT_INIT_DESCRIPTION);
    }

    #[test]
    fn test_config_builder_rejects_empty_name() {
        assert!(RegistryConfig::builder().init_hook("  ").build().is_err());
    }

    #[test]
    fn test_config_deserialize_partial() {
        let config: RegistryConfig =
            serde_json::from_str(r#"{"init_description": "custom"}"#).unwrap();
        assert_eq!(config.init_hook, "Init");
        assert_eq!(config.init_description, "custom");
    }
}
