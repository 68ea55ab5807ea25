//! Error types for configuration validation and loading.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("Invalid mode {mode}")]
    #[diagnostic(
        code(hotswap::config::invalid_mode),
        help("Supported modes are: xhr, fs")
    )]
    InvalidMode { mode: String },

    #[error("url option must be specified for {mode} mode")]
    #[diagnostic(
        code(hotswap::config::missing_url),
        help("Set `url` (or `u`) to the location updates are fetched from")
    )]
    MissingUrl { mode: String },

    #[error("unsupported configuration format: {}", .path.display())]
    #[diagnostic(
        code(hotswap::config::unsupported_format),
        help("Use a .json or .toml configuration file")
    )]
    UnsupportedFormat { path: PathBuf },

    #[error("failed to load configuration: {0}")]
    #[diagnostic(code(hotswap::config::load))]
    Load(String),
}
