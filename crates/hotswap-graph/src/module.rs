//! Module records as they flow through the host pipeline.

use std::fmt;
use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Resolved target of a dependency edge.
///
/// On the wire this is either the target's identity (a string) or `false`
/// when the host excluded the dependency from the bundle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "DepTargetRepr", into = "DepTargetRepr")]
pub enum DepTarget {
    /// The edge resolves to a bundled module with this identity.
    Module(String),
    /// The dependency is not part of the bundle.
    Excluded,
}

impl DepTarget {
    /// Target identity, or `None` for excluded edges.
    pub fn module(&self) -> Option<&str> {
        match self {
            DepTarget::Module(id) => Some(id),
            DepTarget::Excluded => None,
        }
    }

    pub fn is_excluded(&self) -> bool {
        matches!(self, DepTarget::Excluded)
    }
}

impl From<&str> for DepTarget {
    fn from(id: &str) -> Self {
        DepTarget::Module(id.to_string())
    }
}

impl From<String> for DepTarget {
    fn from(id: String) -> Self {
        DepTarget::Module(id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum DepTargetRepr {
    Module(String),
    Flag(bool),
}

impl TryFrom<DepTargetRepr> for DepTarget {
    type Error = String;

    fn try_from(repr: DepTargetRepr) -> Result<Self, Self::Error> {
        match repr {
            DepTargetRepr::Module(id) => Ok(DepTarget::Module(id)),
            DepTargetRepr::Flag(false) => Ok(DepTarget::Excluded),
            DepTargetRepr::Flag(true) => {
                Err("dependency target must be a module id or `false`".to_string())
            }
        }
    }
}

impl From<DepTarget> for DepTargetRepr {
    fn from(target: DepTarget) -> Self {
        match target {
            DepTarget::Module(id) => DepTargetRepr::Module(id),
            DepTarget::Excluded => DepTargetRepr::Flag(false),
        }
    }
}

/// Position assigned to a module by the host's labeling stage.
///
/// Hosts normally assign integers. When full paths are kept in the output the
/// module id itself is the position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModuleIndex {
    Number(u64),
    Name(String),
}

impl fmt::Display for ModuleIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleIndex::Number(n) => write!(f, "{}", n),
            ModuleIndex::Name(name) => write!(f, "{}", name),
        }
    }
}

/// One bundled module as it flows through the pipeline.
///
/// `file` is the module's identity everywhere in this workspace. `id` is the
/// host's own identifier, which only matters as the fallback position when the
/// host keeps full paths instead of assigning numeric indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleRecord {
    pub id: String,
    pub file: String,
    #[serde(default)]
    pub entry: bool,
    #[serde(default)]
    pub expose: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basedir: Option<PathBuf>,
    #[serde(default)]
    pub source: String,
    /// Reference token (as written in the source) to resolved target.
    #[serde(default)]
    pub deps: IndexMap<String, DepTarget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<ModuleIndex>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
}

impl ModuleRecord {
    /// Start building a record whose `id` and `file` are both `file`.
    pub fn builder(file: impl Into<String>) -> ModuleRecordBuilder {
        ModuleRecordBuilder::new(file)
    }

    /// The definitive bundle position, falling back to the host id when no
    /// index was assigned.
    pub fn position(&self) -> ModuleIndex {
        self.index
            .clone()
            .unwrap_or_else(|| ModuleIndex::Name(self.id.clone()))
    }

    /// Identities of every dependency that is part of the bundle, in edge order.
    pub fn bundled_dependencies(&self) -> impl Iterator<Item = &str> {
        self.deps.values().filter_map(DepTarget::module)
    }
}

/// Builder for [`ModuleRecord`].
#[derive(Debug, Clone)]
pub struct ModuleRecordBuilder {
    record: ModuleRecord,
}

impl ModuleRecordBuilder {
    pub fn new(file: impl Into<String>) -> Self {
        let file = file.into();
        Self {
            record: ModuleRecord {
                id: file.clone(),
                file,
                entry: false,
                expose: false,
                basedir: None,
                source: String::new(),
                deps: IndexMap::new(),
                index: None,
                order: None,
            },
        }
    }

    /// Override the host id (defaults to the file).
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.record.id = id.into();
        self
    }

    pub fn entry(mut self, entry: bool) -> Self {
        self.record.entry = entry;
        self
    }

    pub fn expose(mut self, expose: bool) -> Self {
        self.record.expose = expose;
        self
    }

    pub fn basedir(mut self, basedir: impl Into<PathBuf>) -> Self {
        self.record.basedir = Some(basedir.into());
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.record.source = source.into();
        self
    }

    /// Add a dependency edge from `reference` to `target`.
    pub fn dependency(mut self, reference: impl Into<String>, target: impl Into<DepTarget>) -> Self {
        self.record.deps.insert(reference.into(), target.into());
        self
    }

    /// Add an edge the host excluded from the bundle.
    pub fn excluded(mut self, reference: impl Into<String>) -> Self {
        self.record
            .deps
            .insert(reference.into(), DepTarget::Excluded);
        self
    }

    pub fn index(mut self, index: ModuleIndex) -> Self {
        self.record.index = Some(index);
        self
    }

    pub fn order(mut self, order: u32) -> Self {
        self.record.order = Some(order);
        self
    }

    pub fn build(self) -> ModuleRecord {
        self.record
    }
}
