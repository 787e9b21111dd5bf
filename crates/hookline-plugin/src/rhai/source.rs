//! Discovery of script plugins from a plugin directory.

use std::path::PathBuf;
use std::sync::Arc;

use rhai::Engine;
use tracing::{debug, warn};

use super::plugin::ScriptPlugin;
use super::runtime::build_engine;
use crate::config::{MANIFEST_FILE, PluginConfig, PluginManifest};
use crate::discovery::{Candidate, DiscoverySource};
use crate::handler::Instance;
use crate::types::PluginResult;

/// Discovery source for Rhai plugins.
///
/// Every subdirectory of the configured plugin directory holding a
/// `plugin.toml` is a candidate, identified by its manifest name. Scripts
/// are only compiled when the registry decides to load the candidate.
pub struct ScriptSource {
    config: PluginConfig,
    engine: Arc<Engine>,
}

impl ScriptSource {
    /// Create a source for the configured plugin directory.
    pub fn new(config: PluginConfig) -> Self {
        let engine = Arc::new(build_engine(&config.limits));
        Self { config, engine }
    }

    /// The configuration this source scans with.
    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    fn plugin_dirs(&self) -> PluginResult<Vec<PathBuf>> {
        let mut dirs: Vec<PathBuf> = std::fs::read_dir(&self.config.plugin_dir)?
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.join(MANIFEST_FILE).is_file())
            .collect();
        dirs.sort();
        Ok(dirs)
    }
}

impl DiscoverySource for ScriptSource {
    fn name(&self) -> &str {
        "rhai"
    }

    fn discover(&mut self) -> PluginResult<Vec<Candidate>> {
        if !self.config.enabled || !self.config.plugin_dir.is_dir() {
            return Ok(vec![]);
        }

        let mut candidates = vec![];
        for dir in self.plugin_dirs()? {
            let manifest = match PluginManifest::load(&dir) {
                Ok(manifest) => manifest,
                Err(e) => {
                    warn!(path = %dir.display(), error = %e, "Skipping plugin with invalid manifest");
                    continue;
                }
            };

            if !self.config.accepts(&manifest.name) {
                debug!(plugin = %manifest.name, "Plugin filtered out by configuration");
                continue;
            }

            let engine = Arc::clone(&self.engine);
            candidates.push(Candidate::new(manifest.name.clone(), move || {
                ScriptPlugin::load(engine, manifest, &dir).map(|plugin| Arc::new(plugin) as Instance)
            }));
        }

        Ok(candidates)
    }
}
