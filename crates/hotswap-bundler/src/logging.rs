//! Subscriber setup for binaries and tests.
//!
//! Only compiled with the `logging` feature. Libraries embedding hotswap
//! should install their own subscriber; the pipeline itself only emits
//! `tracing` events (`info` on attach/reset, `debug` per stage decision,
//! `trace` per dependency edge).

use std::sync::Once;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Verbosity of hotswap output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Silent,
    Error,
    Warn,
    /// Attach and reset events.
    #[default]
    Info,
    /// Every suppressed entry, wrapped module and emitted manager.
    Debug,
    /// Every recorded dependency edge.
    Trace,
}

impl LogLevel {
    fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Silent => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" | "off" => Ok(LogLevel::Silent),
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(format!("Invalid log level: {}", other)),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_filter())
    }
}

/// Install a global subscriber at `level`; `RUST_LOG` directives still apply.
///
/// Only the first call in a process has any effect.
///
/// ```rust,no_run
/// use hotswap_bundler::logging::{init_logging, LogLevel};
///
/// init_logging(LogLevel::Debug);
/// ```
pub fn init_logging(level: LogLevel) {
    INIT.call_once(|| install(filter_with_default(level)));
}

/// Install a global subscriber configured from `RUST_LOG`, falling back to
/// `info`.
pub fn init_logging_from_env() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| filter_with_default(LogLevel::Info));
        install(filter);
    });
}

fn filter_with_default(level: LogLevel) -> EnvFilter {
    let directive = level
        .as_filter()
        .parse()
        .unwrap_or_else(|_| tracing_subscriber::filter::LevelFilter::INFO.into());
    EnvFilter::builder()
        .with_default_directive(directive)
        .from_env_lossy()
}

fn install(filter: EnvFilter) {
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_target(false).without_time())
        .init();
}
