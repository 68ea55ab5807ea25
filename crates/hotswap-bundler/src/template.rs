//! Manager module template.
//!
//! A template is JavaScript with slot markers of the form
//! `null/*!^^moduleMeta*/`. The marker is a valid `null` literal, so an
//! unrendered template still parses. Rendering writes the literal text
//! segments and a JSON serialization of each slot's value; slot values are
//! never scanned for markers.

use std::borrow::Cow;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::debug;

use crate::{EntryList, Error, HmrConfig, ModuleMetaMap, Result, Runtime, UpdateMode};

/// Template compiled into the crate.
pub const BUNDLED_TEMPLATE: &str = include_str!("../templates/hmr-manager-template.js");

const SLOT_OPEN: &str = "null/*!^^";
const SLOT_CLOSE: &str = "*/";

/// Named value a template receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Module identity to `{ index, hash, parents }`.
    ModuleMeta,
    /// Root entry identities in discovery order.
    OriginalEntries,
    UpdateUrl,
    UpdateMode,
    UpdateCacheBust,
}

impl Slot {
    pub const ALL: [Slot; 5] = [
        Slot::ModuleMeta,
        Slot::OriginalEntries,
        Slot::UpdateUrl,
        Slot::UpdateMode,
        Slot::UpdateCacheBust,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Slot::ModuleMeta => "moduleMeta",
            Slot::OriginalEntries => "originalEntries",
            Slot::UpdateUrl => "updateUrl",
            Slot::UpdateMode => "updateMode",
            Slot::UpdateCacheBust => "updateCacheBust",
        }
    }

    /// The marker text for this slot.
    pub fn marker(&self) -> String {
        format!("{}{}{}", SLOT_OPEN, self.as_str(), SLOT_CLOSE)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Slot {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Slot::ALL
            .into_iter()
            .find(|slot| slot.as_str() == s)
            .ok_or_else(|| Error::InvalidTemplate(format!("unknown slot `{}`", s)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Slot(Slot),
}

/// Values rendered into a template.
#[derive(Debug, Clone, Copy)]
pub struct ManagerData<'a> {
    pub module_meta: &'a ModuleMetaMap,
    pub original_entries: &'a EntryList,
    pub update_url: Option<&'a str>,
    pub update_mode: UpdateMode,
    pub update_cache_bust: bool,
}

impl<'a> ManagerData<'a> {
    pub fn new(
        module_meta: &'a ModuleMetaMap,
        original_entries: &'a EntryList,
        config: &'a HmrConfig,
    ) -> Self {
        Self {
            module_meta,
            original_entries,
            update_url: config.url.as_deref(),
            update_mode: config.mode,
            update_cache_bust: config.cache_bust,
        }
    }
}

/// Parsed template: literal text interleaved with slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerTemplate {
    segments: Vec<Segment>,
}

impl ManagerTemplate {
    /// Split `text` on slot markers.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidTemplate`] for an unterminated marker, an unknown
    /// slot name, or a slot that never appears.
    pub fn parse(text: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut rest = text;

        while let Some(start) = rest.find(SLOT_OPEN) {
            let after_open = &rest[start + SLOT_OPEN.len()..];
            let end = after_open
                .find(SLOT_CLOSE)
                .ok_or_else(|| Error::InvalidTemplate("unterminated slot marker".to_string()))?;
            let slot: Slot = after_open[..end].parse()?;

            if start > 0 {
                segments.push(Segment::Text(rest[..start].to_string()));
            }
            segments.push(Segment::Slot(slot));
            rest = &after_open[end + SLOT_CLOSE.len()..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Text(rest.to_string()));
        }

        let template = Self { segments };
        if let Some(missing) = Slot::ALL.into_iter().find(|slot| !template.has_slot(*slot)) {
            return Err(Error::InvalidTemplate(format!(
                "missing slot `{}`",
                missing
            )));
        }
        Ok(template)
    }

    pub fn has_slot(&self, slot: Slot) -> bool {
        self.segments.contains(&Segment::Slot(slot))
    }

    pub fn render(&self, data: &ManagerData<'_>) -> Result<String> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Slot(slot) => {
                    let value = match slot {
                        Slot::ModuleMeta => serde_json::to_string(data.module_meta)?,
                        Slot::OriginalEntries => serde_json::to_string(data.original_entries)?,
                        Slot::UpdateUrl => serde_json::to_string(&data.update_url)?,
                        Slot::UpdateMode => serde_json::to_string(&data.update_mode)?,
                        Slot::UpdateCacheBust => serde_json::to_string(&data.update_cache_bust)?,
                    };
                    out.push_str(&value);
                }
            }
        }
        Ok(out)
    }
}

/// Where the template text comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TemplateSource {
    #[default]
    Bundled,
    File(PathBuf),
}

impl From<Option<PathBuf>> for TemplateSource {
    fn from(path: Option<PathBuf>) -> Self {
        path.map_or(TemplateSource::Bundled, TemplateSource::File)
    }
}

/// Reads and parses the template at most once.
///
/// Clones share the cached value. A failed load is not cached, so the next
/// build retries it.
#[derive(Debug, Clone)]
pub struct TemplateLoader {
    source: TemplateSource,
    runtime: Arc<dyn Runtime>,
    cached: Arc<OnceCell<Arc<ManagerTemplate>>>,
}

impl TemplateLoader {
    pub fn new(source: TemplateSource, runtime: Arc<dyn Runtime>) -> Self {
        Self {
            source,
            runtime,
            cached: Arc::new(OnceCell::new()),
        }
    }

    pub fn source(&self) -> &TemplateSource {
        &self.source
    }

    pub fn is_loaded(&self) -> bool {
        self.cached.initialized()
    }

    pub async fn load(&self) -> Result<Arc<ManagerTemplate>> {
        let template = self
            .cached
            .get_or_try_init(|| async {
                let text = self.read().await?;
                let template = ManagerTemplate::parse(&text)?;
                debug!(source = ?self.source, "Loaded manager template");
                Ok::<_, Error>(Arc::new(template))
            })
            .await?;
        Ok(Arc::clone(template))
    }

    async fn read(&self) -> Result<Cow<'static, str>> {
        match &self.source {
            TemplateSource::Bundled => Ok(Cow::Borrowed(BUNDLED_TEMPLATE)),
            TemplateSource::File(path) => {
                let bytes = self
                    .runtime
                    .read_file(path)
                    .await
                    .map_err(|source| Error::TemplateLoad {
                        path: path.clone(),
                        source,
                    })?;
                String::from_utf8(bytes).map(Cow::Owned).map_err(|e| {
                    Error::InvalidTemplate(format!("{} is not UTF-8: {}", path.display(), e))
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ModuleIndex, ModuleRecord};

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

    #[test]
    fn test_bundled_template_parses() {
        let template = ManagerTemplate::parse(BUNDLED_TEMPLATE).unwrap();
        for slot in Slot::ALL {
            assert!(template.has_slot(slot), "bundled template lacks {}", slot);
        }
    }

    #[test]
    fn test_render_serializes_each_slot() {
        let template = ManagerTemplate::parse(&json_template()).unwrap();

        let mut meta = ModuleMetaMap::new();
        meta.observe_dependencies(&ModuleRecord::builder("a.js").dependency("./b", "b.js").build());
        meta.label("b.js", ModuleIndex::Number(2), "hash".into()).unwrap();
        let entries: EntryList = ["a.js"].into_iter().collect();
        let config = HmrConfig::xhr("/bundle.js");

        let rendered = template
            .render(&ManagerData::new(&meta, &entries, &config))
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();

        assert_eq!(value["meta"]["b.js"]["parents"], serde_json::json!(["a.js"]));
        assert_eq!(value["meta"]["b.js"]["index"], 2);
        assert_eq!(value["meta"]["a.js"]["hash"], serde_json::Value::Null);
        assert_eq!(value["entries"], serde_json::json!(["a.js"]));
        assert_eq!(value["url"], "/bundle.js");
        assert_eq!(value["mode"], "xhr");
        assert_eq!(value["bust"], true);
    }

    #[test]
    fn test_marker_text_in_data_is_not_substituted() {
        let template = ManagerTemplate::parse(&json_template()).unwrap();
        let meta = ModuleMetaMap::new();
        let marker = Slot::UpdateUrl.marker();
        let entries: EntryList = [marker.as_str()].into_iter().collect();
        let config = HmrConfig::fs();

        let rendered = template
            .render(&ManagerData::new(&meta, &entries, &config))
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();

        assert_eq!(value["entries"][0], marker);
        assert_eq!(value["url"], serde_json::Value::Null);
    }

    #[test]
    fn test_parse_errors() {
        let unknown = json_template().replace("updateUrl", "updateUri");
        assert!(matches!(
            ManagerTemplate::parse(&unknown),
            Err(Error::InvalidTemplate(msg)) if msg.contains("updateUri")
        ));

        let missing = json_template().replace(&Slot::UpdateMode.marker(), "\"fs\"");
        assert!(matches!(
            ManagerTemplate::parse(&missing),
            Err(Error::InvalidTemplate(msg)) if msg.contains("updateMode")
        ));

        assert!(matches!(
            ManagerTemplate::parse("var x = null/*!^^moduleMeta"),
            Err(Error::InvalidTemplate(_))
        ));
    }

    #[tokio::test]
    async fn test_concurrent_loads_share_one_read() {
        use hotswap_graph::runtime::test_utils::MemoryRuntime;

        let runtime = MemoryRuntime::new().with_file("/t.js", json_template());
        let loader = TemplateLoader::new(
            TemplateSource::File("/t.js".into()),
            Arc::new(runtime.clone()),
        );
        let other = loader.clone();

        let (first, second) = tokio::join!(loader.load(), other.load());
        assert!(Arc::ptr_eq(&first.unwrap(), &second.unwrap()));
        assert_eq!(runtime.read_count(), 1);
        assert!(loader.is_loaded());
    }

    #[tokio::test]
    async fn test_bundled_source_never_reads() {
        use hotswap_graph::runtime::test_utils::MemoryRuntime;

        let runtime = MemoryRuntime::new();
        let loader = TemplateLoader::new(TemplateSource::Bundled, Arc::new(runtime.clone()));
        loader.load().await.unwrap();
        assert_eq!(runtime.read_count(), 0);
    }

    #[test]
    fn test_source_from_optional_path() {
        assert_eq!(TemplateSource::from(None), TemplateSource::Bundled);
        assert_eq!(
            TemplateSource::from(Some(PathBuf::from("t.js"))),
            TemplateSource::File(PathBuf::from("t.js"))
        );
    }
}
