//! The four handlers installed by [`HmrPlugin`](crate::HmrPlugin).
//!
//! They share one [`BuildState`] per pipeline instance. A reset builds a
//! new pipeline and a new state, so nothing leaks between builds.

mod entry;
mod graph;
mod manager;
mod wrap;

pub use entry::EntryCollector;
pub use graph::GraphRecorder;
pub use manager::ManagerEmitter;
pub use wrap::{HEADER_LINES, ModuleWrapper, WRAPPER_FOOTER, wrap_module, wrapper_header};

use std::sync::Arc;

use parking_lot::Mutex;

use crate::{EntryList, ModuleMetaMap};

/// State accumulated over one pass.
#[derive(Debug, Default)]
pub struct BuildState {
    pub meta: ModuleMetaMap,
    pub entries: EntryList,
    /// Identity of the synthetic entry, set when the record stage flushes.
    pub manager_id: Option<String>,
}

pub type SharedBuildState = Arc<Mutex<BuildState>>;

impl BuildState {
    pub fn shared() -> SharedBuildState {
        Arc::new(Mutex::new(Self::default()))
    }

    /// Whether `file` is the synthetic entry of this pass.
    pub fn is_manager(&self, file: &str) -> bool {
        self.manager_id.as_deref() == Some(file)
    }
}
