//! Plugin discovery sources.
//!
//! A source enumerates candidates: an identifier plus a deferred
//! instantiation. The registry only instantiates a candidate whose
//! identifier is not loaded yet, so rescanning is cheap and idempotent.

use std::fmt;
use std::sync::Arc;

use compact_str::CompactString;

use crate::handler::Instance;
use crate::types::{PluginId, PluginResult};

type Instantiate = Box<dyn FnOnce() -> PluginResult<Instance> + Send>;

/// A plugin that a source found but the registry has not loaded yet.
pub struct Candidate {
    identifier: PluginId,
    instantiate: Instantiate,
}

impl Candidate {
    /// Create a candidate with a deferred instantiation.
    pub fn new<F>(identifier: impl Into<PluginId>, instantiate: F) -> Self
    where
        F: FnOnce() -> PluginResult<Instance> + Send + 'static,
    {
        Self {
            identifier: identifier.into(),
            instantiate: Box::new(instantiate),
        }
    }

    /// Create a candidate around an existing instance.
    pub fn from_instance(identifier: impl Into<PluginId>, instance: Instance) -> Self {
        Self::new(identifier, move || Ok(instance))
    }

    /// The candidate's stable identifier.
    pub fn identifier(&self) -> &PluginId {
        &self.identifier
    }

    /// Build the instance.
    pub fn instantiate(self) -> PluginResult<Instance> {
        (self.instantiate)()
    }
}

impl fmt::Debug for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Candidate")
            .field("identifier", &self.identifier)
            .finish_non_exhaustive()
    }
}

/// What happened to a candidate offered to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateOutcome {
    /// Inserted into the plugin table and initialized.
    Loaded,
    /// Identifier already loaded; nothing was instantiated.
    AlreadyLoaded,
    /// Instantiated, but the instance failed the capability check.
    Rejected,
    /// Instantiation itself failed.
    Failed,
}

/// Something that can enumerate plugin candidates.
pub trait DiscoverySource: Send {
    /// Source name, used in logs.
    fn name(&self) -> &str;

    /// Enumerate the candidates currently available.
    fn discover(&mut self) -> PluginResult<Vec<Candidate>>;
}

type Factory = Arc<dyn Fn() -> PluginResult<Instance> + Send + Sync>;

/// A fixed, in-memory list of plugin factories.
///
/// Suits hosts that link their plugins statically.
pub struct StaticSource {
    name: CompactString,
    factories: Vec<(PluginId, Factory)>,
}

impl StaticSource {
    /// Create an empty source.
    pub fn new(name: impl Into<CompactString>) -> Self {
        Self {
            name: name.into(),
            factories: Vec::new(),
        }
    }

    /// Add a plugin built by `factory` on each instantiation.
    pub fn with_plugin<F>(mut self, identifier: impl Into<PluginId>, factory: F) -> Self
    where
        F: Fn() -> PluginResult<Instance> + Send + Sync + 'static,
    {
        self.factories.push((identifier.into(), Arc::new(factory)));
        self
    }

    /// Add an existing instance.
    pub fn with_instance(self, identifier: impl Into<PluginId>, instance: Instance) -> Self {
        self.with_plugin(identifier, move || Ok(Arc::clone(&instance)))
    }

    /// Number of plugins this source offers.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Check if this source offers nothing.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl DiscoverySource for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn discover(&mut self) -> PluginResult<Vec<Candidate>> {
        Ok(self
            .factories
            .iter()
            .map(|(id, factory)| {
                let factory = Arc::clone(factory);
                Candidate::new(id.clone(), move || factory())
            })
            .collect())
    }
}
