#![cfg_attr(docsrs, feature(doc_cfg))]

//! # hotswap-bundler
//!
//! Build-time hot module replacement instrumentation for a staged bundle
//! pipeline, on top of the `hotswap-graph` data model.
//!
//! [`HmrPlugin`] attaches four handlers to the host [`Pipeline`]:
//!
//! | Stage    | Handler              | Effect                                                  |
//! |----------|----------------------|---------------------------------------------------------|
//! | `record` | [`EntryCollector`]   | replaces all entries with one synthetic entry           |
//! | `deps`   | [`GraphRecorder`]    | records `parents` for every resolved edge               |
//! | `syntax` | [`ModuleWrapper`]    | wraps modules and rewrites their inline source maps     |
//! | `label`  | [`ManagerEmitter`]   | fills `index`/`hash` and emits the manager module first |
//!
//! ## Quick Start
//!
//! ```no_run
//! use hotswap_bundler::{Bundle, HmrOptions, HmrPlugin, ModuleRecord, ModuleSet};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let options = HmrOptions::default().mode("fs");
//!
//! let mut bundle = Bundle::new();
//! bundle.plugin(HmrPlugin::new(&options)?)?;
//!
//! let modules: ModuleSet = [
//!     ModuleRecord::builder("src/a.js")
//!         .entry(true)
//!         .source("require('./c');")
//!         .dependency("./c", "src/c.js")
//!         .build(),
//!     ModuleRecord::builder("src/c.js").source("module.exports = 1;").build(),
//! ]
//! .into_iter()
//! .collect();
//!
//! let output = bundle.bundle(&modules).await?;
//! assert_eq!(output[0].file, "src/__hmr_manager.js");
//! # Ok(()) }
//! ```

// Re-export everything from the foundation crates
pub use hotswap_config::{ConfigError, HmrConfig, HmrOptions, UpdateMode};
pub use hotswap_graph::*;

pub mod pipeline;
pub mod plugin;
pub mod source_map;
pub mod stages;
pub mod template;

// Logging utilities (optional, enabled with "logging" feature)
#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub mod logging;

#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub use logging::{LogLevel, init_logging, init_logging_from_env};

pub use pipeline::{Bundle, IndexLabeler, ModuleSet, Pipeline, PipelinePlugin, Stage, StageName};
pub use plugin::HmrPlugin;
pub use stages::{
    BuildState, EntryCollector, GraphRecorder, ManagerEmitter, ModuleWrapper, SharedBuildState,
};
pub use template::{ManagerData, ManagerTemplate, Slot, TemplateLoader, TemplateSource};

use std::path::PathBuf;

/// Error types for hotswap-bundler operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Options failed validation before the pipeline was wired.
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The record stage finished without seeing a single entry.
    #[error("No entry points found; the hot reload manager needs at least one entry")]
    NoEntries,

    /// The manager template could not be read.
    #[error("Failed to load manager template {}: {source}", .path.display())]
    TemplateLoad {
        path: PathBuf,
        #[source]
        source: RuntimeError,
    },

    /// The manager template is malformed.
    #[error("Invalid manager template: {0}")]
    InvalidTemplate(String),

    /// A module carried an inline source map that could not be decoded.
    #[error("Invalid input source map in {file}: {reason}")]
    InvalidInputMap { file: String, reason: String },

    /// The rewritten source map could not be serialized.
    #[error("Source map error in {file}: {reason}")]
    SourceMap { file: String, reason: String },

    /// The synthetic entry never reached the label stage.
    #[error("The synthetic entry did not reach the label stage")]
    MissingManagerRecord,

    /// A module was labeled that never passed the dependency stage.
    #[error("Unknown module: {0}")]
    UnknownModule(String),

    /// Serializing manager data failed.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type alias for hotswap-bundler operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<hotswap_graph::Error> for Error {
    fn from(error: hotswap_graph::Error) -> Self {
        match error {
            hotswap_graph::Error::UnknownModule(id) => Error::UnknownModule(id),
            hotswap_graph::Error::NoEntries => Error::NoEntries,
        }
    }
}

impl miette::Diagnostic for Error {
    fn code(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        Some(Box::new(match self {
            Error::Config(_) => "INVALID_CONFIG",
            Error::NoEntries => "NO_ENTRIES",
            Error::TemplateLoad { .. } => "TEMPLATE_LOAD",
            Error::InvalidTemplate(_) => "INVALID_TEMPLATE",
            Error::InvalidInputMap { .. } => "INVALID_INPUT_MAP",
            Error::SourceMap { .. } => "SOURCE_MAP",
            Error::MissingManagerRecord => "MISSING_MANAGER_RECORD",
            Error::UnknownModule(_) => "UNKNOWN_MODULE",
            Error::Serialize(_) => "SERIALIZE",
        }))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(miette::Severity::Error)
    }

    fn help(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        match self {
            Error::Config(err) => miette::Diagnostic::help(err),
            Error::NoEntries => Some(Box::new(
                "Mark at least one module as an entry point. The manager module is placed next to the first entry.",
            )),
            Error::TemplateLoad { path, .. } => Some(Box::new(format!(
                "Check that the template '{}' exists and is readable, or unset `template` to use the bundled one.",
                path.display()
            ))),
            Error::InvalidTemplate(_) => Some(Box::new(
                "Templates must contain each slot marker exactly as `null/*!^^name*/` for moduleMeta, originalEntries, updateUrl, updateMode and updateCacheBust.",
            )),
            Error::InvalidInputMap { file, .. } => Some(Box::new(format!(
                "Remove or regenerate the inline sourceMappingURL comment in '{}'.",
                file
            ))),
            _ => None,
        }
    }
}
