//! Config file loading
//!
//! Config lives at `.config/matchcheck/config.styx` relative to the working
//! directory, unless a path is given explicitly.

use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr};
use tracing::debug;

pub use matchcheck_config::{Config, Conventions};

pub const DEFAULT_CONFIG_PATH: &str = ".config/matchcheck/config.styx";

/// Load the config file.
///
/// An explicit path must exist. Without one, the default location is used
/// when present and the built-in conventions otherwise.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let path = match explicit {
        Some(path) => {
            if !path.exists() {
                eyre::bail!("Config file not found at {}", path.display());
            }
            path.to_path_buf()
        }
        None => {
            let path = PathBuf::from(DEFAULT_CONFIG_PATH);
            if !path.exists() {
                debug!("no config file at {}, using defaults", path.display());
                return Ok(Config::default());
            }
            path
        }
    };

    let content = std::fs::read_to_string(&path)
        .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = facet_styx::from_str(&content)
        .map_err(|e| eyre::eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    debug!(path = %path.display(), "loaded config");
    Ok(config)
}
