use std::borrow::Cow;

use async_trait::async_trait;

use super::SharedBuildState;
use crate::{ModuleRecord, Result, Stage};

/// Deps stage: records every resolved edge into the module meta map.
///
/// Observes only; records pass through untouched.
#[derive(Debug)]
pub struct GraphRecorder {
    state: SharedBuildState,
}

impl GraphRecorder {
    pub fn new(state: SharedBuildState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl Stage for GraphRecorder {
    fn name(&self) -> Cow<'static, str> {
        "hmr-graph-recorder".into()
    }

    async fn transform(&mut self, record: ModuleRecord) -> Result<Option<ModuleRecord>> {
        let mut state = self.state.lock();
        if !state.is_manager(&record.file) {
            state.meta.observe_dependencies(&record);
        }
        drop(state);
        Ok(Some(record))
    }
}
