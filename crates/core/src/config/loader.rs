use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Environment variable naming an optional TOML configuration file.
pub const CONFIG_PATH_ENV: &str = "ORG_TEARDOWN_CONFIG";

/// Prefix for environment overrides, e.g. `ORG_TEARDOWN_TEARDOWN__DRY_RUN=true`.
pub const ENV_PREFIX: &str = "ORG_TEARDOWN_";

/// Load configuration from defaults, an optional file, and environment overrides.
///
/// When `path` is `None` no file is read and only defaults plus environment
/// variables apply.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    if let Some(path) = path {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        figment = figment.merge(Toml::file(path));
    }

    figment
        .merge(Env::prefixed(ENV_PREFIX).ignore(&["CONFIG"]).split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}
