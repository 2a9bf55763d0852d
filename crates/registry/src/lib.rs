//! Provider Registry & Factory (spec §4.C): an explicit registration table
//! mapping id → constructor, replacing the source system's runtime
//! reflection (Design Notes §9). Registration happens once at process
//! start from the composition root; thereafter the registry is read-mostly,
//! with an `RwLock` guarding the rare enable/disable mutation.

use std::{
    collections::{HashSet, RwLock},
    sync::Arc,
};

use provider_core::ProviderAdapter;
use thiserror::Error;

type Constructor = Arc<dyn Fn() -> Arc<dyn ProviderAdapter> + Send + Sync>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("unknown provider {0}")]
    UnknownProvider(String),
}

struct Entry {
    id: String,
    display_name: String,
    constructor: Constructor,
}

/// Ordered provider registration table plus an enable/disable flag per id.
/// Order of `register()` calls is preserved by every listing operation
/// (spec §4.C/§4.E: `all_providers` must be deterministic).
pub struct Registry {
    entries: Vec<Entry>,
    enabled: RwLock<HashSet<String>>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            enabled: RwLock::new(HashSet::new()),
        }
    }

    /// Registers an adapter constructor under `id`, enabled by default.
    pub fn register(
        &mut self,
        id: impl Into<String>,
        display_name: impl Into<String>,
        constructor: impl Fn() -> Arc<dyn ProviderAdapter> + Send + Sync + 'static,
    ) {
        let id = id.into();
        self.enabled.write().unwrap().insert(id.clone());
        self.entries.push(Entry {
            id,
            display_name: display_name.into(),
            constructor: Arc::new(constructor),
        });
    }

    /// All registered ids, in registration order, regardless of enabled
    /// state.
    pub fn list_ids(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.id.clone()).collect()
    }

    pub fn display_name(&self, id: &str) -> Option<String> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.display_name.clone())
    }

    pub fn is_enabled(&self, id: &str) -> bool {
        self.enabled.read().unwrap().contains(id)
    }

    pub fn set_enabled(&self, id: &str, enabled: bool) {
        let mut guard = self.enabled.write().unwrap();
        if enabled {
            guard.insert(id.to_string());
        } else {
            guard.remove(id);
        }
    }

    /// Instantiates a fresh adapter for `id`.
    pub fn build(&self, id: &str) -> Result<Arc<dyn ProviderAdapter>, RegistryError> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| (e.constructor)())
            .ok_or_else(|| RegistryError::UnknownProvider(id.to_string()))
    }

    /// The set of ids that should be dispatched to for one request (spec
    /// §4.C): start from all ids, intersect with `include` when non-empty,
    /// subtract `exclude`, subtract disabled ids. Registration order is
    /// preserved.
    pub fn active_ids(
        &self,
        include: Option<&HashSet<String>>,
        exclude: Option<&HashSet<String>>,
    ) -> Vec<String> {
        let enabled = self.enabled.read().unwrap();
        self.entries
            .iter()
            .map(|e| &e.id)
            .filter(|id| enabled.contains(*id))
            .filter(|id| include.map(|set| set.contains(*id)).unwrap_or(true))
            .filter(|id| !exclude.map(|set| set.contains(*id)).unwrap_or(false))
            .cloned()
            .collect()
    }

    /// Instantiates every active adapter, in the same order `active_ids`
    /// returns — the order the fan-out executor dispatches in and
    /// `all_providers` reports in (spec §4.E).
    pub fn build_active(
        &self,
        include: Option<&HashSet<String>>,
        exclude: Option<&HashSet<String>>,
    ) -> Vec<Arc<dyn ProviderAdapter>> {
        self.active_ids(include, exclude)
            .into_iter()
            .filter_map(|id| self.build(&id).ok())
            .collect()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
