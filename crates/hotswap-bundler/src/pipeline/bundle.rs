use std::sync::Arc;

use tracing::{debug, info};

use super::{ModuleSet, Pipeline, PipelinePlugin};
use crate::{ModuleRecord, Result};

/// Build driver that owns a pipeline and the plugins attached to it.
///
/// Pipelines are single-use: handlers keep per-pass state. A second call to
/// [`Bundle::bundle`] therefore resets first, exactly as an explicit
/// [`Bundle::reset`] would.
#[derive(Debug)]
pub struct Bundle {
    pipeline: Pipeline,
    plugins: Vec<Arc<dyn PipelinePlugin>>,
    full_paths: bool,
    bundled: bool,
}

impl Bundle {
    pub fn new() -> Self {
        Self::with_full_paths(false)
    }

    /// Keep module ids as positions instead of assigning integers.
    pub fn with_full_paths(full_paths: bool) -> Self {
        Self {
            pipeline: Pipeline::with_full_paths(full_paths),
            plugins: Vec::new(),
            full_paths,
            bundled: false,
        }
    }

    /// Attach `plugin` to the current pipeline and remember it for resets.
    pub fn plugin(&mut self, plugin: impl PipelinePlugin + 'static) -> Result<&mut Self> {
        plugin.attach(&mut self.pipeline)?;
        debug!(plugin = %plugin.name(), "Attached plugin");
        self.plugins.push(Arc::new(plugin));
        Ok(self)
    }

    /// Replace the pipeline with a fresh one and re-attach every plugin.
    ///
    /// Nothing accumulated by the previous pipeline's handlers survives.
    pub fn reset(&mut self) -> Result<()> {
        let mut pipeline = Pipeline::with_full_paths(self.full_paths);
        for plugin in &self.plugins {
            plugin.attach(&mut pipeline)?;
        }
        self.pipeline = pipeline;
        self.bundled = false;

        info!(plugins = self.plugins.len(), "Pipeline reset");
        Ok(())
    }

    /// Run one pass over `modules`, resetting first if this bundle already ran.
    pub async fn bundle(&mut self, modules: &ModuleSet) -> Result<Vec<ModuleRecord>> {
        if self.bundled {
            self.reset()?;
        }
        self.bundled = true;
        self.pipeline.run(modules).await
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Direct access for hosts that install their own handlers.
    ///
    /// Handlers pushed here are lost on the next reset.
    pub fn pipeline_mut(&mut self) -> &mut Pipeline {
        &mut self.pipeline
    }
}

impl Default for Bundle {
    fn default() -> Self {
        Self::new()
    }
}
