//! CLI subcommand implementations.

use std::path::PathBuf;

use tokenvote_core::config::Config;

pub mod address;
pub mod serve;

/// Resolve and load configuration.
///
/// An explicit `--config` path must exist. Without one, `~/.tokenvote/config.yaml`
/// is used when present and built-in defaults otherwise.
pub(crate) fn load_config(config: Option<PathBuf>) -> Result<Config, Box<dyn std::error::Error>> {
    let path = match config {
        Some(path) => Some(path),
        None => dirs::home_dir()
            .map(|home| home.join(".tokenvote").join("config.yaml"))
            .filter(|path| path.exists()),
    };

    let config = match path {
        Some(path) => {
            tracing::info!("loading config from {}", path.display());
            Config::from_file(&path)?
        }
        None => {
            tracing::info!("no config file found, using defaults");
            Config::default()
        }
    };
    Ok(config.with_env_overrides()?)
}
