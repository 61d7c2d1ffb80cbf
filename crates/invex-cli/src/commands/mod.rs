//! CLI commands.

pub mod batch;
pub mod extract;
pub mod rules;

use std::path::{Path, PathBuf};

use tracing::debug;

use invex_core::InvexConfig;

/// Default configuration file location.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("invex")
        .join("config.json")
}

/// Resolve the configuration file: the `--config` path if given, otherwise
/// the default location.
pub fn config_path(explicit: Option<&str>) -> PathBuf {
    explicit.map(PathBuf::from).unwrap_or_else(default_config_path)
}

/// Load configuration. An explicit path must exist; a missing default file
/// falls back to the built-in rules.
pub fn load_config(explicit: Option<&str>) -> anyhow::Result<InvexConfig> {
    if let Some(path) = explicit {
        return Ok(InvexConfig::from_file(Path::new(path))?);
    }

    let path = default_config_path();
    if path.exists() {
        debug!("Using config file {}", path.display());
        Ok(InvexConfig::from_file(&path)?)
    } else {
        Ok(InvexConfig::default())
    }
}
