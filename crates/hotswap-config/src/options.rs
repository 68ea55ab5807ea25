//! Update delivery options and their validation.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, Result};

/// How the runtime manager receives updated modules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateMode {
    /// Poll an HTTP endpoint for the rebuilt bundle.
    #[default]
    Xhr,
    /// Read the rebuilt bundle from the local file system (Node, Electron).
    Fs,
}

impl UpdateMode {
    pub const ALL: [UpdateMode; 2] = [UpdateMode::Xhr, UpdateMode::Fs];

    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateMode::Xhr => "xhr",
            UpdateMode::Fs => "fs",
        }
    }

    /// Whether this mode needs an update location.
    pub fn requires_url(&self) -> bool {
        matches!(self, UpdateMode::Xhr)
    }
}

impl fmt::Display for UpdateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UpdateMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        UpdateMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| ConfigError::InvalidMode {
                mode: s.to_string(),
            })
    }
}

/// Raw options as supplied by the caller.
///
/// Every option has a one-letter alias. When both the long form and its
/// alias are present the long form wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HmrOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub m: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub u: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_bust: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub b: Option<bool>,

    /// Custom manager template; the bundled template is used when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<PathBuf>,
}

impl HmrOptions {
    pub fn mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn cache_bust(mut self, cache_bust: bool) -> Self {
        self.cache_bust = Some(cache_bust);
        self
    }

    pub fn template(mut self, template: impl Into<PathBuf>) -> Self {
        self.template = Some(template.into());
        self
    }

    /// Apply defaults and validate.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidMode`] for an unrecognized mode
    /// - [`ConfigError::MissingUrl`] when the mode needs a url and none is set
    pub fn resolve(&self) -> Result<HmrConfig> {
        // Empty strings count as unset, like an omitted option
        let mode = pick(
            "mode",
            non_empty(self.mode.as_deref()),
            non_empty(self.m.as_deref()),
        );
        let mode = match mode {
            Some(mode) => mode.parse()?,
            None => UpdateMode::default(),
        };

        let url = pick(
            "url",
            non_empty(self.url.as_deref()),
            non_empty(self.u.as_deref()),
        )
        .map(str::to_string);

        let cache_bust = pick("cacheBust", self.cache_bust, self.b).unwrap_or(true);

        if url.is_none() && mode.requires_url() {
            return Err(ConfigError::MissingUrl {
                mode: mode.to_string(),
            });
        }

        Ok(HmrConfig {
            mode,
            url,
            cache_bust,
            template: self.template.clone(),
        })
    }
}

/// Validated configuration embedded into the manager module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HmrConfig {
    pub mode: UpdateMode,
    pub url: Option<String>,
    pub cache_bust: bool,
    #[serde(skip)]
    pub template: Option<PathBuf>,
}

impl HmrConfig {
    /// Configuration for the `fs` mode with cache busting on.
    pub fn fs() -> Self {
        Self {
            mode: UpdateMode::Fs,
            url: None,
            cache_bust: true,
            template: None,
        }
    }

    /// Configuration for the `xhr` mode fetching from `url`.
    pub fn xhr(url: impl Into<String>) -> Self {
        Self {
            mode: UpdateMode::Xhr,
            url: Some(url.into()),
            cache_bust: true,
            template: None,
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Long form first, alias as fallback.
fn pick<T: PartialEq + fmt::Debug>(name: &str, long: Option<T>, alias: Option<T>) -> Option<T> {
    match (long, alias) {
        (Some(long), Some(alias)) => {
            if long != alias {
                warn!(
                    option = name,
                    used = ?long,
                    ignored = ?alias,
                    "Option and its alias disagree; using the long form"
                );
            }
            Some(long)
        }
        (long, alias) => long.or(alias),
    }
}
