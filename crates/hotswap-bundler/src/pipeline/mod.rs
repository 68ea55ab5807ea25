//! Host pipeline with named stages.
//!
//! A bundle pass streams [`ModuleRecord`]s through four stages in a fixed
//! order. Each stage holds an ordered list of handlers; every handler sees
//! the full output of the previous one, record by record, and is then
//! flushed so it can emit anything it buffered.
//!
//! Between the `record` and `deps` stages the host walks resolved
//! dependency edges from the surviving records, so modules only reachable
//! from a replaced entry still enter the stream.

mod bundle;
mod labeler;
mod modules;

pub use bundle::Bundle;
pub use labeler::IndexLabeler;
pub use modules::ModuleSet;

use std::borrow::Cow;
use std::fmt;

use async_trait::async_trait;
use tracing::debug;

use crate::{ModuleRecord, Result};

/// Named stage of the host pipeline.
///
/// Stages run in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StageName {
    /// Raw records as the host reads them, entries included.
    Record = 0,
    /// Records with resolved dependency edges.
    Deps = 1,
    /// Records after source transforms.
    Syntax = 2,
    /// Records with their final bundle positions.
    Label = 3,
}

impl StageName {
    pub const ALL: [StageName; 4] = [
        StageName::Record,
        StageName::Deps,
        StageName::Syntax,
        StageName::Label,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StageName::Record => "record",
            StageName::Deps => "deps",
            StageName::Syntax => "syntax",
            StageName::Label => "label",
        }
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One handler inside a stage.
#[async_trait]
pub trait Stage: Send + fmt::Debug {
    fn name(&self) -> Cow<'static, str>;

    /// Handle one record. Returning `None` drops it from the stream.
    async fn transform(&mut self, record: ModuleRecord) -> Result<Option<ModuleRecord>>;

    /// Called once after the last record; returned records are appended to
    /// the stream.
    async fn flush(&mut self) -> Result<Vec<ModuleRecord>> {
        Ok(Vec::new())
    }
}

/// Something that installs handlers onto a pipeline.
///
/// `attach` runs once per pipeline instance, so it is called again for the
/// fresh pipeline built on every [`Bundle::reset`].
pub trait PipelinePlugin: Send + Sync + fmt::Debug {
    fn name(&self) -> Cow<'static, str>;

    fn attach(&self, pipeline: &mut Pipeline) -> Result<()>;
}

/// Ordered stages and their handlers for one bundle pass.
#[derive(Debug)]
pub struct Pipeline {
    stages: [Vec<Box<dyn Stage>>; 4],
    full_paths: bool,
}

impl Pipeline {
    /// Pipeline that assigns sequential integer positions at the label stage.
    pub fn new() -> Self {
        Self::with_full_paths(false)
    }

    /// With `full_paths` on, the host keeps module ids instead of assigning
    /// integer positions, so no labeler is installed.
    pub fn with_full_paths(full_paths: bool) -> Self {
        let mut pipeline = Self {
            stages: Default::default(),
            full_paths,
        };
        if !full_paths {
            pipeline.push(StageName::Label, IndexLabeler::new());
        }
        pipeline
    }

    pub fn full_paths(&self) -> bool {
        self.full_paths
    }

    /// Mutable handler list of a stage.
    pub fn get(&mut self, name: StageName) -> &mut Vec<Box<dyn Stage>> {
        &mut self.stages[name as usize]
    }

    /// Append a handler to a stage.
    pub fn push(&mut self, name: StageName, stage: impl Stage + 'static) {
        self.get(name).push(Box::new(stage));
    }

    /// Handler names of a stage, in run order.
    pub fn handler_names(&self, name: StageName) -> Vec<Cow<'static, str>> {
        self.stages[name as usize]
            .iter()
            .map(|stage| stage.name())
            .collect()
    }

    /// Run one pass over `modules`.
    ///
    /// The stream starts with the entry records of `modules`.
    pub async fn run(&mut self, modules: &ModuleSet) -> Result<Vec<ModuleRecord>> {
        let mut stream: Vec<ModuleRecord> = modules.entries().cloned().collect();

        for name in StageName::ALL {
            if name == StageName::Deps {
                stream = modules.resolve(stream);
            }
            stream = self.run_stage(name, stream).await?;
        }

        Ok(stream)
    }

    async fn run_stage(
        &mut self,
        name: StageName,
        mut stream: Vec<ModuleRecord>,
    ) -> Result<Vec<ModuleRecord>> {
        for handler in self.stages[name as usize].iter_mut() {
            let mut output = Vec::with_capacity(stream.len());
            for record in stream {
                if let Some(record) = handler.transform(record).await? {
                    output.push(record);
                }
            }
            output.extend(handler.flush().await?);

            debug!(stage = %name, handler = %handler.name(), records = output.len(), "Stage handler finished");
            stream = output;
        }

        Ok(stream)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}
