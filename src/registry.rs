//! Name-keyed registry of catalog sources
//!
//! The registry is filled once at startup and only read (or handed out as
//! disjoint `&mut` managers for fetching) afterwards.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::FetchConfig;
use crate::data::{
    parse_clinical_icb_set, parse_pharmaco_set, parse_radio_set, parse_toxico_set,
    parse_xeva_set, RecordParser,
};
use crate::error::{Error, Result};
use crate::source::{SourceDescriptor, SourceManager};
use crate::transport::Transport;

/// Base URL of the ORCESTRA API
pub const ORCESTRA_API: &str = "https://orcestra.ca/api";

/// Descriptors for every ORCESTRA catalog endpoint
pub fn orcestra_sources() -> Vec<SourceDescriptor> {
    let sources: [(&str, &str, RecordParser); 5] = [
        ("psets", "psets", parse_pharmaco_set),
        ("radiosets", "radiosets", parse_radio_set),
        ("toxicosets", "toxicosets", parse_toxico_set),
        ("xevasets", "xevasets", parse_xeva_set),
        ("icbsets", "clinical_icb", parse_clinical_icb_set),
    ];
    sources
        .into_iter()
        .map(|(name, path, parser)| {
            SourceDescriptor::new(name, format!("{ORCESTRA_API}/{path}/available"), parser)
        })
        .collect()
}

/// Registry of source managers, iterated in name order
#[derive(Default)]
pub struct SourceRegistry {
    managers: BTreeMap<String, SourceManager>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry holding one manager per descriptor
    pub fn from_descriptors(
        descriptors: impl IntoIterator<Item = SourceDescriptor>,
        config: &FetchConfig,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let mut registry = Self::new();
        for descriptor in descriptors {
            registry.register(SourceManager::new(descriptor, config, Arc::clone(&transport)));
        }
        registry
    }

    /// Builds the registry of all ORCESTRA sources
    pub fn orcestra(config: &FetchConfig, transport: Arc<dyn Transport>) -> Self {
        Self::from_descriptors(orcestra_sources(), config, transport)
    }

    /// Adds a manager under its descriptor name, replacing any previous one
    pub fn register(&mut self, manager: SourceManager) {
        self.managers.insert(manager.name().to_string(), manager);
    }

    /// Looks up a manager by name
    pub fn get(&self, name: &str) -> Result<&SourceManager> {
        self.managers
            .get(name)
            .ok_or_else(|| self.unknown_source(name))
    }

    /// Looks up a manager by name for fetching
    pub fn get_mut(&mut self, name: &str) -> Result<&mut SourceManager> {
        if !self.managers.contains_key(name) {
            return Err(self.unknown_source(name));
        }
        match self.managers.get_mut(name) {
            Some(manager) => Ok(manager),
            None => unreachable!("source '{name}' is registered"),
        }
    }

    /// All registered managers keyed by name
    pub fn all(&self) -> &BTreeMap<String, SourceManager> {
        &self.managers
    }

    /// Mutable access to every manager, one disjoint borrow each
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut SourceManager)> {
        self.managers.iter_mut()
    }

    /// Registered source names in order
    pub fn names(&self) -> Vec<String> {
        self.managers.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.managers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.managers.is_empty()
    }

    fn unknown_source(&self, name: &str) -> Error {
        Error::UnknownSource {
            name: name.to_string(),
            available: self.names(),
        }
    }
}
