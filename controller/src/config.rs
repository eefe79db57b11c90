use std::path::Path;

use config::environment::Environment;
use config::shared::ControllerConfig;
use config::{load_config, load_config_from};

/// Loads and validates the controller configuration.
///
/// Reads from `configuration/` in the working directory unless `config_dir` is given.
pub fn load_controller_config(config_dir: Option<&Path>) -> anyhow::Result<ControllerConfig> {
    let config = match config_dir {
        Some(dir) => load_config_from::<ControllerConfig>(dir, Environment::load()?)?,
        None => load_config::<ControllerConfig>()?,
    };

    Ok(config)
}
