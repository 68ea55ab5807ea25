//! # hotswap-graph
//!
//! Pure data structures for instrumenting a bundle for hot module replacement.
//!
//! This crate holds everything the build-time pipeline needs to describe a
//! bundle to the runtime update manager, without any pipeline logic:
//!
//! - [`ModuleRecord`]: one bundled module as it flows through the host pipeline
//! - [`ModuleMetaMap`]: per-module `{ index, hash, parents }` metadata, built
//!   incrementally from resolved dependency edges
//! - [`EntryList`]: program roots in discovery order, and the source of the
//!   synthetic entry that requires them
//! - [`content_hash`]: the change fingerprint stored in each module's metadata
//! - [`runtime::Runtime`]: platform file access used to read manager templates
//!
//! ## Quick Start
//!
//! ```rust
//! use hotswap_graph::{ModuleMetaMap, ModuleRecord};
//!
//! let a = ModuleRecord::builder("src/a.js")
//!     .source("require('./c');")
//!     .dependency("./c", "src/c.js")
//!     .build();
//!
//! let mut meta = ModuleMetaMap::new();
//! meta.observe_dependencies(&a);
//!
//! assert_eq!(meta.get("src/c.js").unwrap().parents, vec!["src/a.js".to_string()]);
//! ```

pub mod entry;
pub mod hash;
pub mod meta;
pub mod module;
pub mod runtime;


pub use entry::{EntryList, MANAGER_FILENAME};
pub use hash::{CONTENT_HASH_LEN, content_hash};
pub use meta::{ModuleMeta, ModuleMetaMap};
pub use module::{DepTarget, ModuleIndex, ModuleRecord, ModuleRecordBuilder};
pub use runtime::{Runtime, RuntimeError, RuntimeResult};

/// Error types for hotswap-graph operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A module was referenced that the graph has never seen.
    #[error("Unknown module: {0}")]
    UnknownModule(String),

    /// No entry points were collected, so there is nothing to anchor on.
    #[error("No entry points were found in the bundle")]
    NoEntries,
}

/// Result type alias for hotswap-graph operations.
pub type Result<T> = std::result::Result<T, Error>;
