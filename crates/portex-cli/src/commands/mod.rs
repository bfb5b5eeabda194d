//! CLI subcommands.

pub mod config;
pub mod extract;
pub mod validate;

use std::path::Path;

use portex_core::models::config::PortexConfig;

/// Load the pipeline configuration, preferring an explicit path.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<PortexConfig> {
    match config_path {
        Some(path) => Ok(PortexConfig::from_file(Path::new(path))?),
        None => Ok(PortexConfig::default()),
    }
}
