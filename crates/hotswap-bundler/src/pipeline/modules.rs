use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use tracing::{trace, warn};

use crate::ModuleRecord;

/// Every module the host can read, keyed by file.
///
/// Iteration order is insertion order, so entries enter the pipeline in the
/// order they were added.
#[derive(Debug, Clone, Default)]
pub struct ModuleSet {
    modules: IndexMap<String, ModuleRecord>,
}

impl ModuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a module.
    pub fn insert(&mut self, record: ModuleRecord) -> Option<ModuleRecord> {
        self.modules.insert(record.file.clone(), record)
    }

    pub fn remove(&mut self, file: &str) -> Option<ModuleRecord> {
        self.modules.shift_remove(file)
    }

    pub fn get(&self, file: &str) -> Option<&ModuleRecord> {
        self.modules.get(file)
    }

    pub fn get_mut(&mut self, file: &str) -> Option<&mut ModuleRecord> {
        self.modules.get_mut(file)
    }

    pub fn entries(&self) -> impl Iterator<Item = &ModuleRecord> {
        self.modules.values().filter(|record| record.entry)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Expand `roots` with everything reachable through bundled edges.
    ///
    /// Depth-first preorder, each file at most once. Roots are kept as they
    /// are (they may be synthetic and absent from the set); reached modules
    /// are cloned from the set.
    pub(crate) fn resolve(&self, roots: Vec<ModuleRecord>) -> Vec<ModuleRecord> {
        let mut seen = FxHashSet::default();
        let mut output = Vec::with_capacity(self.modules.len());

        for root in roots {
            let mut stack = vec![root];

            while let Some(record) = stack.pop() {
                if !seen.insert(record.file.clone()) {
                    continue;
                }

                let children: Vec<ModuleRecord> = record
                    .bundled_dependencies()
                    .filter(|dep| !seen.contains(*dep))
                    .filter_map(|dep| match self.modules.get(dep) {
                        Some(child) => Some(child.clone()),
                        None => {
                            warn!(parent = %record.file, dependency = dep, "Dependency is not in the module set");
                            None
                        }
                    })
                    .collect();

                trace!(module = %record.file, children = children.len(), "Resolved module");
                output.push(record);
                stack.extend(children.into_iter().rev());
            }
        }

        output
    }
}

impl FromIterator<ModuleRecord> for ModuleSet {
    fn from_iter<I: IntoIterator<Item = ModuleRecord>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl Extend<ModuleRecord> for ModuleSet {
    fn extend<I: IntoIterator<Item = ModuleRecord>>(&mut self, iter: I) {
        for record in iter {
            self.insert(record);
        }
    }
}
