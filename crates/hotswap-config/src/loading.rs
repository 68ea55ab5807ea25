use crate::error::{ConfigError, Result};
use crate::options::HmrOptions;
use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized, Toml},
};
use std::path::Path;

/// Environment variable prefix (`HOTSWAP_MODE`, `HOTSWAP_URL`, ...).
pub const ENV_PREFIX: &str = "HOTSWAP_";

impl HmrOptions {
    /// Load options from multiple sources.
    /// Priority: environment variables > config file > `base`
    ///
    /// The file format is picked from the extension (`.json` or `.toml`).
    /// Options are only loaded here; call [`HmrOptions::resolve`] to validate.
    pub fn load(base: HmrOptions, config_path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(base));

        if let Some(path) = config_path {
            figment = match path.extension().and_then(|ext| ext.to_str()) {
                Some("json") => figment.merge(Json::file(path)),
                Some("toml") => figment.merge(Toml::file(path)),
                _ => {
                    return Err(ConfigError::UnsupportedFormat {
                        path: path.to_path_buf(),
                    });
                }
            };
        }

        figment = figment.merge(env_provider());

        figment
            .extract()
            .map_err(|e| ConfigError::Load(e.to_string()))
    }
}

/// `HOTSWAP_*` variables keyed the way option files spell them.
///
/// Keys arrive with their original case and figment would lowercase them
/// after mapping, so lowercasing happens here and `cache_bust` becomes the
/// camelCase `cacheBust`.
fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX)
        .lowercase(false)
        .map(|key| env_key(key.as_str()).into())
}

fn env_key(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    match key.as_str() {
        "cache_bust" | "cachebust" => "cacheBust".to_string(),
        _ => key,
    }
}
