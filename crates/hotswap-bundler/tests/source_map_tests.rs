//! Source maps of wrapped modules resolve back to original positions.

mod helpers;

use base64::{Engine, engine::general_purpose::STANDARD};
use helpers::*;
use hotswap_bundler::source_map::{INLINE_MAP_PREFIX, to_inline_comment};
use hotswap_bundler::stages::{HEADER_LINES, wrap_module};
use hotswap_bundler::{Error, ModuleRecord, ModuleSet};
use proptest::prelude::*;
use sourcemap::{SourceMap, SourceMapBuilder};

fn trailing_map(wrapped: &str) -> SourceMap {
    let (_, encoded) = wrapped
        .rsplit_once(INLINE_MAP_PREFIX)
        .expect("wrapped module ends with an inline map");
    SourceMap::from_slice(&STANDARD.decode(encoded).unwrap()).unwrap()
}

/// Map of a transpiled file: each output line `i` came from `orig.ts`
/// line `2 * i + 1`, column 4.
fn transpiler_map(lines: u32) -> SourceMap {
    let mut builder = SourceMapBuilder::new(Some("compiled.js"));
    let src = builder.add_source("src/orig.ts");
    builder.set_source_contents(src, Some("// original typescript"));
    for line in 0..lines {
        builder.add_raw(line, 0, 2 * line + 1, 4, Some(src), None, false);
    }
    builder.into_sourcemap()
}

#[test]
fn round_trip_without_input_map() {
    let source = "var a = 1;\nvar b = 2;\nmodule.exports = a + b;";
    let wrapped = wrap_module("lib/sum.js", source).unwrap();
    let map = trailing_map(&wrapped);

    assert_eq!(map.get_source_contents(0), Some(source));
    let generated: Vec<&str> = wrapped.lines().collect();
    for (line, text) in source.lines().enumerate() {
        let generated_line = line as u32 + HEADER_LINES;
        assert_eq!(generated[generated_line as usize], text);

        let token = map.lookup_token(generated_line, 0).unwrap();
        assert_eq!(token.get_source(), Some("lib/sum.js"));
        assert_eq!(token.get_src_line(), line as u32);
    }
}

#[test]
fn composition_matches_input_map() {
    let input = transpiler_map(3);
    let source = format!(
        "var a = 1;\nvar b = 2;\nvar c = 3;\n{}",
        to_inline_comment("compiled.js", &input).unwrap()
    );

    let wrapped = wrap_module("compiled.js", &source).unwrap();
    assert_eq!(wrapped.matches(INLINE_MAP_PREFIX).count(), 1);

    let composed = trailing_map(&wrapped);
    assert_eq!(composed.get_file(), Some("compiled.js"));
    assert_eq!(composed.get_source(0), Some("src/orig.ts"));
    assert_eq!(
        composed.get_source_contents(0),
        Some("// original typescript")
    );

    for line in 0..3 {
        let expected = input.lookup_token(line, 0).unwrap();
        let actual = composed.lookup_token(line + HEADER_LINES, 0).unwrap();
        assert_eq!(actual.get_source(), expected.get_source());
        assert_eq!(actual.get_src_line(), expected.get_src_line());
        assert_eq!(actual.get_src_col(), expected.get_src_col());
    }
}

#[test]
fn input_map_file_takes_precedence() {
    let input = transpiler_map(1);
    let source = format!("x();\n{}", to_inline_comment("x.js", &input).unwrap());

    let composed = trailing_map(&wrap_module("renamed.js", &source).unwrap());
    assert_eq!(composed.get_file(), Some("compiled.js"));
}

#[test]
fn text_json_input_map_is_composed() {
    let input = transpiler_map(2);
    let mut json = Vec::new();
    input.to_writer(&mut json).unwrap();
    let source = format!(
        "var a = 1;\nvar b = 2;\n//# sourceMappingURL=data:text/json;base64,{}",
        STANDARD.encode(json)
    );

    let wrapped = wrap_module("compiled.js", &source).unwrap();
    assert_eq!(wrapped.matches("sourceMappingURL").count(), 1);

    let composed = trailing_map(&wrapped);
    assert_eq!(composed.get_source(0), Some("src/orig.ts"));
    let token = composed.lookup_token(1 + HEADER_LINES, 0).unwrap();
    assert_eq!(token.get_src_line(), 3);
}

#[tokio::test]
async fn pipeline_rejects_corrupt_input_map() {
    let runtime = template_runtime();
    let mut bundle = hmr_bundle(&runtime);

    let modules: ModuleSet = [ModuleRecord::builder("a.js")
        .entry(true)
        .source("x();\n//# sourceMappingURL=data:application/json;base64,e30K!!")
        .build()]
    .into_iter()
    .collect();

    // `!!` is outside the base64 alphabet, so the comment is not an inline map
    let output = bundle.bundle(&modules).await.unwrap();
    assert_eq!(output[1].source.matches("sourceMappingURL").count(), 2);

    let modules: ModuleSet = [ModuleRecord::builder("a.js")
        .entry(true)
        .source("x();\n//# sourceMappingURL=data:application/json;base64,bm9wZQ==")
        .build()]
    .into_iter()
    .collect();

    let err = bundle.bundle(&modules).await.unwrap_err();
    assert!(matches!(err, Error::InvalidInputMap { file, .. } if file == "a.js"));
}

#[tokio::test]
async fn wrapped_modules_in_bundle_carry_maps() {
    let runtime = template_runtime();
    let mut bundle = hmr_bundle(&runtime);

    let output = bundle.bundle(&abc_modules()).await.unwrap();
    let modules = abc_modules();

    for record in &output[1..] {
        let map = trailing_map(&record.source);
        let original = &modules.get(&record.file).unwrap().source;
        assert_eq!(map.get_source(0), Some(record.file.as_str()));
        assert_eq!(map.get_source_contents(0), Some(original.as_str()));
    }
    // The manager itself is never wrapped
    assert!(!output[0].source.contains(INLINE_MAP_PREFIX));
}

proptest! {
    #[test]
    fn every_line_maps_back(lines in prop::collection::vec("[a-z =;0-9]{0,30}", 1..40)) {
        let source = lines.join("\n");
        let map = trailing_map(&wrap_module("gen.js", &source).unwrap());

        for line in 0..lines.len() as u32 {
            let token = map.lookup_token(line + HEADER_LINES, 0).unwrap();
            prop_assert_eq!(token.get_src_line(), line);
            prop_assert_eq!(token.get_dst_line(), line + HEADER_LINES);
        }
        prop_assert_eq!(map.get_source_contents(0), Some(source.as_str()));
    }
}
