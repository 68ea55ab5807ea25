use std::borrow::Cow;

use async_trait::async_trait;
use tracing::debug;

use super::SharedBuildState;
use crate::source_map::{LineOffsetMap, extract_inline_map, to_inline_comment};
use crate::{ModuleRecord, Result, Stage};

/// Lines the wrapper header adds above the module body.
pub const HEADER_LINES: u32 = 2;

/// Closes the scope opened by [`wrapper_header`].
pub const WRAPPER_FOOTER: &str = "\n}).apply(this, arguments);\n";

/// Registers the module with the manager and opens a closure that runs with
/// the loader's `this` and arguments.
pub fn wrapper_header(file: &str) -> Result<String> {
    Ok(format!(
        "_hmr.initModule({}, module);\n(function(){{\n",
        serde_json::to_string(file)?
    ))
}

/// Wrap `source` and replace its inline source map.
///
/// Any inline map in `source` is stripped; the last one found is composed
/// with the header shift so positions still resolve to the original files.
pub fn wrap_module(file: &str, source: &str) -> Result<String> {
    let (body, input) = extract_inline_map(file, source)?;
    let offset = LineOffsetMap::new(file, HEADER_LINES);

    let map = match &input {
        Some(input) if input.get_source_count() > 0 => {
            debug!(module = file, sources = input.get_source_count(), "Composed input source map");
            offset.apply(input, file)
        }
        // A map without sources carries nothing to compose except its file
        Some(input) => offset.build(&body, input.get_file().unwrap_or(file)),
        None => offset.build(&body, file),
    };

    Ok(format!(
        "{}{}{}\n{}",
        wrapper_header(file)?,
        body,
        WRAPPER_FOOTER,
        to_inline_comment(file, &map)?
    ))
}

/// Syntax stage: wraps every module except the synthetic entry.
#[derive(Debug)]
pub struct ModuleWrapper {
    state: SharedBuildState,
}

impl ModuleWrapper {
    pub fn new(state: SharedBuildState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl Stage for ModuleWrapper {
    fn name(&self) -> Cow<'static, str> {
        "hmr-module-wrapper".into()
    }

    async fn transform(&mut self, mut record: ModuleRecord) -> Result<Option<ModuleRecord>> {
        if self.state.lock().is_manager(&record.file) {
            return Ok(Some(record));
        }

        record.source = wrap_module(&record.file, &record.source)?;
        debug!(module = %record.file, "Wrapped module");
        Ok(Some(record))
    }
}
