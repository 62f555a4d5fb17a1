//! Command implementations.

pub mod build;
pub mod check;
pub mod serve;

use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};
use spacetraveling_core::Config;

/// Load and validate the configuration, applying environment overrides.
pub fn load_config(config_path: &Path) -> Result<Config> {
    let config = Config::load(config_path).wrap_err_with(|| {
        format!("Failed to load configuration from {}", config_path.display())
    })?;
    tracing::debug!(?config, "Loaded configuration");
    Ok(config)
}
