use std::borrow::Cow;
use std::sync::Arc;

use tracing::info;

use crate::pipeline::{Pipeline, PipelinePlugin, StageName};
use crate::stages::{BuildState, EntryCollector, GraphRecorder, ManagerEmitter, ModuleWrapper};
use crate::template::{TemplateLoader, TemplateSource};
use crate::{HmrConfig, HmrOptions, Result, Runtime};

/// Hot module replacement instrumentation for a [`Pipeline`].
///
/// Options are validated when the plugin is created, before any pipeline
/// exists. The template loader lives here rather than in the per-build
/// state, so the template is read once no matter how many resets follow.
#[derive(Debug)]
pub struct HmrPlugin {
    config: HmrConfig,
    loader: TemplateLoader,
}

impl HmrPlugin {
    /// Validate `options` and read templates from the local filesystem.
    ///
    /// # Errors
    ///
    /// [`Error::Config`](crate::Error::Config) for an unknown mode or a
    /// missing url.
    #[cfg(not(target_family = "wasm"))]
    pub fn new(options: &HmrOptions) -> Result<Self> {
        Self::with_runtime(options, Arc::new(crate::runtime::native::NativeRuntime))
    }

    /// Validate `options` and read templates through `runtime`.
    pub fn with_runtime(options: &HmrOptions, runtime: Arc<dyn Runtime>) -> Result<Self> {
        Ok(Self::from_config(options.resolve()?, runtime))
    }

    /// Use an already validated configuration.
    pub fn from_config(config: HmrConfig, runtime: Arc<dyn Runtime>) -> Self {
        let source = TemplateSource::from(config.template.clone());
        Self {
            loader: TemplateLoader::new(source, runtime),
            config,
        }
    }

    pub fn config(&self) -> &HmrConfig {
        &self.config
    }

    pub fn template_loader(&self) -> &TemplateLoader {
        &self.loader
    }
}

impl PipelinePlugin for HmrPlugin {
    fn name(&self) -> Cow<'static, str> {
        "hmr".into()
    }

    fn attach(&self, pipeline: &mut Pipeline) -> Result<()> {
        let state = BuildState::shared();

        pipeline.push(StageName::Record, EntryCollector::new(Arc::clone(&state)));
        pipeline.push(StageName::Deps, GraphRecorder::new(Arc::clone(&state)));
        pipeline.push(StageName::Syntax, ModuleWrapper::new(Arc::clone(&state)));
        pipeline.push(
            StageName::Label,
            ManagerEmitter::new(state, self.config.clone(), self.loader.clone()),
        );

        info!(
            mode = %self.config.mode,
            url = self.config.url.as_deref().unwrap_or(""),
            cache_bust = self.config.cache_bust,
            "Attached hot module replacement"
        );
        Ok(())
    }
}
