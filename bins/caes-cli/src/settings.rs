//! Layered configuration: built-in defaults, then a TOML file, then
//! `CAES_`-prefixed environment variables (`CAES_DECAY__ANNUAL_RATE=0.03`).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use caes_core::config::CaesConfig;
use config::{Config, Environment, File};

/// Default config file location (`~/.config/caes/config.toml` on Linux).
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("caes")
        .join("config.toml")
}

/// Load configuration from the process environment.
///
/// An explicit `path` must exist; the default path is used only if present.
pub fn load(path: Option<&Path>) -> Result<CaesConfig> {
    load_with_env(path, None)
}

/// Like [`load`], with an explicit environment map in place of the process
/// environment when `env` is `Some`.
pub fn load_with_env(
    path: Option<&Path>,
    env: Option<config::Map<String, String>>,
) -> Result<CaesConfig> {
    let mut builder = Config::builder();

    match path {
        Some(path) => {
            builder = builder.add_source(File::from(path).required(true));
        }
        None => {
            let default_path = default_config_path();
            builder = builder.add_source(File::from(default_path).required(false));
        }
    }

    builder = builder.add_source(
        Environment::with_prefix("CAES")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .source(env),
    );

    let cfg: CaesConfig = builder
        .build()
        .context("failed to read configuration")?
        .try_deserialize()
        .context("failed to parse configuration")?;

    cfg.validate().context("invalid configuration")?;
    Ok(cfg)
}
