//! Application configuration for Miles.
//!
//! Provides [`AppConfig`]: app naming, the wallet network, the product
//! catalog, and logging settings. Values come from a settings file (TOML or
//! JSON, by extension) and may be overridden by `MILES_*` environment
//! variables.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use miles_core::catalog::Catalog;
use miles_core::constants::{
    DEFAULT_APP_NAME, DEFAULT_APP_TITLE, DEFAULT_CONFIG_FILE, DEFAULT_LOG_FORMAT,
    DEFAULT_LOG_LEVEL, ENV_PREFIX,
};
use miles_core::error::MilesError;
use miles_core::types::{Network, Product};

/// Settings file shape before catalog validation.
#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawConfig {
    app_name: String,
    app_title: String,
    network: Network,
    products: Vec<Product>,
    log_level: String,
    log_format: String,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            app_title: DEFAULT_APP_TITLE.to_string(),
            network: Network::default(),
            products: Vec::new(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_format: DEFAULT_LOG_FORMAT.to_string(),
        }
    }
}

/// Validated application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Name announced to the wallet provider.
    pub app_name: String,
    /// Title shown by the presentation layer.
    pub app_title: String,
    /// Network requested on connect.
    pub network: Network,
    /// Redeemable products.
    pub catalog: Catalog,
    /// Log level filter string (e.g. "info", "miles_session=debug").
    pub log_level: String,
    /// Log output format ("text" or "json").
    pub log_format: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let raw = RawConfig::default();
        Self {
            app_name: raw.app_name,
            app_title: raw.app_title,
            network: raw.network,
            catalog: Catalog::default(),
            log_level: raw.log_level,
            log_format: raw.log_format,
        }
    }
}

impl AppConfig {
    /// `<config dir>/miles/settings.toml`.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_APP_NAME)
            .join(DEFAULT_CONFIG_FILE)
    }

    /// Load from `path`, which must exist, applying environment overrides.
    pub fn load(path: &Path) -> Result<Self, MilesError> {
        Self::build(path, true, None)
    }

    /// Load from `path` if given, else from [`default_path`](Self::default_path)
    /// when it exists, else fall back to defaults plus environment overrides.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, MilesError> {
        match path {
            Some(p) => Self::load(p),
            None => Self::build(&Self::default_path(), false, None),
        }
    }

    fn build(
        path: &Path,
        required: bool,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, MilesError> {
        let raw: RawConfig = config::Config::builder()
            .add_source(config::File::from(path).required(required))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .source(env),
            )
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| MilesError::Config(e.to_string()))?;

        let catalog = Catalog::new(raw.products)?;

        Ok(Self {
            app_name: raw.app_name,
            app_title: raw.app_title,
            network: raw.network,
            catalog,
            log_level: raw.log_level,
            log_format: raw.log_format,
        })
    }
}
