//! Configuration for hot module replacement instrumentation.
//!
//! [`HmrOptions`] is the raw, user-facing option bag (long names plus their
//! one-letter aliases). [`HmrOptions::resolve`] validates it into an
//! [`HmrConfig`] before any pipeline stage is wired up, so bad options fail
//! fast and synchronously.
//!
//! ```
//! use hotswap_config::{HmrOptions, UpdateMode};
//!
//! let config = HmrOptions::default().mode("fs").resolve().unwrap();
//! assert_eq!(config.mode, UpdateMode::Fs);
//! assert!(config.cache_bust);
//!
//! // xhr delivery needs somewhere to fetch updates from
//! assert!(HmrOptions::default().mode("xhr").resolve().is_err());
//! ```

pub mod error;
pub mod loading;
pub mod options;

pub use error::{ConfigError, Result};
pub use options::{HmrConfig, HmrOptions, UpdateMode};
