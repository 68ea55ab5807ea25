//! Per-module metadata handed to the runtime update manager.
//!
//! Entries are created lazily the first time a module is seen, either as a
//! dependent or as a dependency. `index` and `hash` stay unset until the module
//! itself passes the labeling stage.

use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::module::{ModuleIndex, ModuleRecord};
use crate::{Error, Result};

/// Bundle position, content fingerprint, and dependents of one module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleMeta {
    pub index: Option<ModuleIndex>,
    pub hash: Option<String>,
    /// Modules that depend on this one, in discovery order.
    ///
    /// One entry per edge, so a parent importing this module through two
    /// different references appears twice.
    pub parents: Vec<String>,
}

impl ModuleMeta {
    /// Whether the labeling stage has filled in this module.
    pub fn is_labeled(&self) -> bool {
        self.index.is_some() && self.hash.is_some()
    }
}

/// Module identity to [`ModuleMeta`], in first-seen order.
///
/// Serializes as a plain JSON object keyed by module identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleMetaMap(IndexMap<String, ModuleMeta>);

impl ModuleMetaMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the entry for `id`, creating an empty one on first reference.
    pub fn ensure(&mut self, id: &str) -> &mut ModuleMeta {
        match self.0.entry(id.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                trace!(module = id, "Created module meta entry");
                entry.insert(ModuleMeta::default())
            }
        }
    }

    /// Record a module and its resolved dependency edges.
    ///
    /// Every non-excluded target gets `record.file` appended to its parents.
    pub fn observe_dependencies(&mut self, record: &ModuleRecord) {
        self.ensure(&record.file);

        for (reference, target) in &record.deps {
            let Some(target) = target.module() else {
                trace!(module = %record.file, reference = %reference, "Skipping excluded dependency");
                continue;
            };

            trace!(parent = %record.file, child = target, "Recorded dependency edge");
            self.ensure(target).parents.push(record.file.clone());
        }
    }

    /// Fill in the final position and fingerprint of a module.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownModule`] if the module never passed the
    /// dependency stage.
    pub fn label(&mut self, id: &str, index: ModuleIndex, hash: String) -> Result<()> {
        let meta = self
            .0
            .get_mut(id)
            .ok_or_else(|| Error::UnknownModule(id.to_string()))?;
        meta.index = Some(index);
        meta.hash = Some(hash);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&ModuleMeta> {
        self.0.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ModuleMeta)> {
        self.0.iter().map(|(id, meta)| (id.as_str(), meta))
    }

    /// Identities of modules that were referenced but never labeled.
    pub fn unlabeled(&self) -> impl Iterator<Item = &str> {
        self.iter()
            .filter(|(_, meta)| !meta.is_labeled())
            .map(|(id, _)| id)
    }
}
