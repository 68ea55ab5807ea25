//! Inline source map handling for wrapped modules.
//!
//! Wrapping only prepends whole lines, so the map from wrapped code back to
//! the pre-wrap text is a pure line shift. That makes composition with a
//! module's existing map exact: every token of the input map keeps its
//! original position and only its generated line moves down.

use std::borrow::Cow;
use std::sync::LazyLock;

use base64::{Engine, engine::general_purpose::STANDARD};
use regex::Regex;
use sourcemap::{SourceMap, SourceMapBuilder};

use crate::{Error, Result};

/// Prefix of the comment appended to wrapped modules.
pub const INLINE_MAP_PREFIX: &str = "//# sourceMappingURL=data:application/json;charset=utf-8;base64,";

/// Inline base64 JSON source maps (`application/json` or `text/json`), as line (`//#`, legacy `//@`) or block comments.
static INLINE_MAP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[ \t]*//[#@][ \t]*sourceMappingURL=data:(?:application|text)/json[^,\s]*;base64,([A-Za-z0-9+/=]+)[ \t]*\r?$|/\*[#@][ \t]*sourceMappingURL=data:(?:application|text)/json[^,\s]*;base64,([A-Za-z0-9+/=]+)[ \t]*\*/",
    )
    .expect("inline source map pattern is valid")
});

/// Remove every inline source map comment from `source`.
pub fn strip_inline_maps(source: &str) -> Cow<'_, str> {
    INLINE_MAP.replace_all(source, "")
}

/// Find the last inline source map in `source`, parse it, and strip all
/// inline map comments.
///
/// # Errors
///
/// Returns [`Error::InvalidInputMap`] if the embedded map is not valid
/// base64 or not a valid source map.
pub fn extract_inline_map(file: &str, source: &str) -> Result<(String, Option<SourceMap>)> {
    let Some(encoded) = INLINE_MAP
        .captures_iter(source)
        .last()
        .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
    else {
        return Ok((source.to_string(), None));
    };

    let invalid = |reason: String| Error::InvalidInputMap {
        file: file.to_string(),
        reason,
    };

    let bytes = STANDARD
        .decode(encoded.as_str())
        .map_err(|e| invalid(format!("invalid base64: {}", e)))?;
    let map = SourceMap::from_slice(&bytes).map_err(|e| invalid(e.to_string()))?;

    Ok((strip_inline_maps(source).into_owned(), Some(map)))
}

/// Serialize `map` as an inline source map comment.
pub fn to_inline_comment(file: &str, map: &SourceMap) -> Result<String> {
    let mut json = Vec::new();
    map.to_writer(&mut json).map_err(|e| Error::SourceMap {
        file: file.to_string(),
        reason: e.to_string(),
    })?;
    Ok(format!("{}{}", INLINE_MAP_PREFIX, STANDARD.encode(json)))
}

/// Line-granularity mapping for code shifted down by a fixed header.
#[derive(Debug, Clone, Copy)]
pub struct LineOffsetMap<'a> {
    source_name: &'a str,
    header_lines: u32,
}

impl<'a> LineOffsetMap<'a> {
    pub fn new(source_name: &'a str, header_lines: u32) -> Self {
        Self {
            source_name,
            header_lines,
        }
    }

    /// Map for `content` with no prior map: original line `i` lands on
    /// generated line `i + header_lines`, column 0.
    pub fn build(&self, content: &str, map_file: &str) -> SourceMap {
        let mut builder = SourceMapBuilder::new(Some(map_file));
        let src_id = builder.add_source(self.source_name);
        builder.set_source_contents(src_id, Some(content));

        let lines = content.split('\n').count() as u32;
        for line in 0..lines {
            builder.add_raw(
                line + self.header_lines,
                0,
                line,
                0,
                Some(src_id),
                None,
                false,
            );
        }

        builder.into_sourcemap()
    }

    /// Compose an existing map with this line shift.
    ///
    /// Sources, contents and names come from `input`. The input's `file`
    /// wins over `default_file`.
    pub fn apply(&self, input: &SourceMap, default_file: &str) -> SourceMap {
        let mut builder = SourceMapBuilder::new(Some(input.get_file().unwrap_or(default_file)));

        let source_ids: Vec<u32> = input
            .sources()
            .enumerate()
            .map(|(idx, source)| {
                let id = builder.add_source(source);
                builder.set_source_contents(id, input.get_source_contents(idx as u32));
                id
            })
            .collect();

        let name_ids: Vec<u32> = input.names().map(|name| builder.add_name(name)).collect();

        for token in input.tokens() {
            builder.add_raw(
                token.get_dst_line() + self.header_lines,
                token.get_dst_col(),
                token.get_src_line(),
                token.get_src_col(),
                source_ids.get(token.get_src_id() as usize).copied(),
                name_ids.get(token.get_name_id() as usize).copied(),
                false,
            );
        }

        builder.into_sourcemap()
    }
}
