use std::borrow::Cow;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::SharedBuildState;
use crate::template::{ManagerData, TemplateLoader};
use crate::{Error, HmrConfig, ModuleRecord, Result, Stage, content_hash};

/// Label stage: fills in `index` and `hash` for every module, then emits
/// the manager module ahead of everything else.
#[derive(Debug)]
pub struct ManagerEmitter {
    state: SharedBuildState,
    config: HmrConfig,
    loader: TemplateLoader,
    manager: Option<ModuleRecord>,
    buffered: Vec<ModuleRecord>,
}

impl ManagerEmitter {
    pub fn new(state: SharedBuildState, config: HmrConfig, loader: TemplateLoader) -> Self {
        Self {
            state,
            config,
            loader,
            manager: None,
            buffered: Vec::new(),
        }
    }
}

#[async_trait]
impl Stage for ManagerEmitter {
    fn name(&self) -> Cow<'static, str> {
        "hmr-manager-emitter".into()
    }

    async fn transform(&mut self, record: ModuleRecord) -> Result<Option<ModuleRecord>> {
        let mut state = self.state.lock();
        if state.is_manager(&record.file) {
            self.manager = Some(record);
            return Ok(None);
        }

        state
            .meta
            .label(&record.file, record.position(), content_hash(&record.source))?;
        drop(state);

        self.buffered.push(record);
        Ok(None)
    }

    async fn flush(&mut self) -> Result<Vec<ModuleRecord>> {
        let mut manager = self.manager.take().ok_or(Error::MissingManagerRecord)?;
        let template = self.loader.load().await?;

        manager.source = {
            let state = self.state.lock();
            let unlabeled: Vec<&str> = state.meta.unlabeled().collect();
            if !unlabeled.is_empty() {
                warn!(modules = ?unlabeled, "Modules referenced but never labeled");
            }
            template.render(&ManagerData::new(&state.meta, &state.entries, &self.config))?
        };
        debug!(manager = %manager.file, modules = self.buffered.len(), "Emitted manager module");

        let mut output = Vec::with_capacity(self.buffered.len() + 1);
        output.push(manager);
        output.append(&mut self.buffered);
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{Slot, TemplateSource};
    use crate::{BuildState, ModuleIndex};
    use hotswap_graph::runtime::test_utils::MemoryRuntime;
    use std::sync::Arc;

    fn json_template() -> String {
        format!(
            r#"{{"meta":{},"entries":{},"url":{},"mode":{},"bust":{}}}"#,
            Slot::ModuleMeta.marker(),
            Slot::OriginalEntries.marker(),
            Slot::UpdateUrl.marker(),
            Slot::UpdateMode.marker(),
            Slot::UpdateCacheBust.marker(),
        )
    }

    fn emitter(state: SharedBuildState, runtime: MemoryRuntime) -> ManagerEmitter {
        let loader = TemplateLoader::new(TemplateSource::File("/tpl.js".into()), Arc::new(runtime));
        ManagerEmitter::new(state, HmrConfig::fs(), loader)
    }

    fn labeled(file: &str, index: u64) -> ModuleRecord {
        ModuleRecord::builder(file)
            .source(format!("// {}", file))
            .index(ModuleIndex::Number(index))
            .build()
    }

    #[tokio::test]
    async fn test_manager_first_then_arrival_order() {
        let state = BuildState::shared();
        {
            let mut state = state.lock();
            state.manager_id = Some("__hmr_manager.js".into());
            state.entries.push("b.js");
            for file in ["b.js", "a.js"] {
                state.meta.ensure(file);
            }
        }
        let runtime = MemoryRuntime::new().with_file("/tpl.js", json_template());
        let mut emitter = emitter(state.clone(), runtime);

        // Manager arrives last
        for record in [
            labeled("b.js", 2),
            labeled("a.js", 3),
            labeled("__hmr_manager.js", 1),
        ] {
            assert!(emitter.transform(record).await.unwrap().is_none());
        }

        let output = emitter.flush().await.unwrap();
        let files: Vec<_> = output.iter().map(|r| r.file.as_str()).collect();
        assert_eq!(files, vec!["__hmr_manager.js", "b.js", "a.js"]);

        let data: serde_json::Value = serde_json::from_str(&output[0].source).unwrap();
        assert_eq!(data["meta"]["a.js"]["index"], 3);
        assert_eq!(data["meta"]["a.js"]["hash"], content_hash("// a.js"));
        assert_eq!(data["entries"], serde_json::json!(["b.js"]));
        assert_eq!(data["mode"], "fs");
        assert!(!data["meta"].as_object().unwrap().contains_key("__hmr_manager.js"));
    }

    #[tokio::test]
    async fn test_missing_manager_record() {
        let state = BuildState::shared();
        state.lock().manager_id = Some("__hmr_manager.js".into());
        let mut emitter = emitter(state, MemoryRuntime::new());

        assert!(matches!(
            emitter.flush().await,
            Err(Error::MissingManagerRecord)
        ));
    }

    #[tokio::test]
    async fn test_unknown_module_is_an_error() {
        let state = BuildState::shared();
        state.lock().manager_id = Some("__hmr_manager.js".into());
        let mut emitter = emitter(state, MemoryRuntime::new());

        let err = emitter.transform(labeled("stray.js", 1)).await.unwrap_err();
        assert!(matches!(err, Error::UnknownModule(id) if id == "stray.js"));
    }

    #[tokio::test]
    async fn test_template_failure_propagates() {
        let state = BuildState::shared();
        state.lock().manager_id = Some("__hmr_manager.js".into());
        let mut emitter = emitter(state, MemoryRuntime::new());

        emitter
            .transform(labeled("__hmr_manager.js", 1))
            .await
            .unwrap();
        let err = emitter.flush().await.unwrap_err();
        assert!(matches!(err, Error::TemplateLoad { path, .. } if path.ends_with("tpl.js")));
    }
}
