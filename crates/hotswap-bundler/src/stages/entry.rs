use std::borrow::Cow;

use async_trait::async_trait;
use tracing::debug;

use super::SharedBuildState;
use crate::{Error, ModuleRecord, Result, Stage};

/// Record stage: swaps every entry for one synthetic entry that requires
/// them all in order.
#[derive(Debug)]
pub struct EntryCollector {
    state: SharedBuildState,
}

impl EntryCollector {
    pub fn new(state: SharedBuildState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl Stage for EntryCollector {
    fn name(&self) -> Cow<'static, str> {
        "hmr-entry-collector".into()
    }

    async fn transform(&mut self, record: ModuleRecord) -> Result<Option<ModuleRecord>> {
        if !record.entry {
            return Ok(Some(record));
        }

        debug!(entry = %record.file, "Suppressed entry");
        self.state.lock().entries.push(record.file);
        Ok(None)
    }

    async fn flush(&mut self) -> Result<Vec<ModuleRecord>> {
        let mut state = self.state.lock();
        if state.entries.is_empty() {
            return Err(Error::NoEntries);
        }

        let id = state.entries.manager_id()?;
        let mut builder = ModuleRecord::builder(&id)
            .entry(true)
            .expose(false)
            .order(0)
            .source(state.entries.require_source());
        // Edges to the real entries let the host pull them back in
        for entry in state.entries.iter() {
            builder = builder.dependency(entry, entry);
        }

        debug!(id = %id, entries = state.entries.len(), "Emitted synthetic entry");
        state.manager_id = Some(id);
        Ok(vec![builder.build()])
    }
}
