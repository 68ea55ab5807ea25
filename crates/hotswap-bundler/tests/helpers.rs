//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use hotswap_bundler::runtime::test_utils::MemoryRuntime;
use hotswap_bundler::{
    Bundle, HmrOptions, HmrPlugin, ModuleRecord, ModuleSet, Result, Slot, Stage, StageName,
};
use parking_lot::Mutex;
use std::borrow::Cow;

pub const TEMPLATE_PATH: &str = "/templates/manager.js";

/// A template whose rendered form is a JSON document.
pub fn json_template() -> String {
    format!(
        r#"{{"meta":{},"entries":{},"url":{},"mode":{},"bust":{}}}"#,
        Slot::ModuleMeta.marker(),
        Slot::OriginalEntries.marker(),
        Slot::UpdateUrl.marker(),
        Slot::UpdateMode.marker(),
        Slot::UpdateCacheBust.marker(),
    )
}

pub fn template_runtime() -> MemoryRuntime {
    MemoryRuntime::new().with_file(TEMPLATE_PATH, json_template())
}

pub fn fs_options() -> HmrOptions {
    HmrOptions::default().mode("fs").template(TEMPLATE_PATH)
}

/// Bundle with the HMR plugin reading the JSON template from `runtime`.
pub fn hmr_bundle(runtime: &MemoryRuntime) -> Bundle {
    let plugin = HmrPlugin::with_runtime(&fs_options(), Arc::new(runtime.clone()))
        .expect("valid options");
    let mut bundle = Bundle::new();
    bundle.plugin(plugin).expect("attach");
    bundle
}

/// Manager data rendered through [`json_template`].
pub fn manager_data(output: &[ModuleRecord]) -> serde_json::Value {
    serde_json::from_str(&output[0].source).expect("manager renders as JSON")
}

pub fn files(records: &[ModuleRecord]) -> Vec<&str> {
    records.iter().map(|r| r.file.as_str()).collect()
}

/// `a.js` and `b.js` are entries; `a.js` requires `c.js`.
pub fn abc_modules() -> ModuleSet {
    [
        ModuleRecord::builder("a.js")
            .entry(true)
            .source("var c = require('./c');\nc();")
            .dependency("./c", "c.js")
            .build(),
        ModuleRecord::builder("b.js")
            .entry(true)
            .source("console.log('b');")
            .build(),
        ModuleRecord::builder("c.js")
            .source("module.exports = function() {};")
            .build(),
    ]
    .into_iter()
    .collect()
}

/// Copies every record it sees.
#[derive(Debug, Clone, Default)]
pub struct Probe {
    pub seen: Arc<Mutex<Vec<ModuleRecord>>>,
}

impl Probe {
    pub fn install(bundle: &mut Bundle, stage: StageName) -> Self {
        let probe = Probe::default();
        bundle.pipeline_mut().push(stage, probe.clone());
        probe
    }

    pub fn take(&self) -> Vec<ModuleRecord> {
        std::mem::take(&mut *self.seen.lock())
    }
}

#[async_trait]
impl Stage for Probe {
    fn name(&self) -> Cow<'static, str> {
        "probe".into()
    }

    async fn transform(&mut self, record: ModuleRecord) -> Result<Option<ModuleRecord>> {
        self.seen.lock().push(record.clone());
        Ok(Some(record))
    }
}
