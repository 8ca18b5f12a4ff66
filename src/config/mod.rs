pub mod schema;
pub mod secrets;

pub use schema::{AgentConfig, UnknownToolPolicy};
pub use secrets::Secrets;

use crate::error::ConfigError;
use std::path::{Path, PathBuf};

/// Default config location (~/.aptos-agent/agent.toml).
pub fn default_config_path() -> PathBuf {
    PathBuf::from(shellexpand::tilde("~/.aptos-agent/agent.toml").into_owned())
}

/// Load config from the given path, or return defaults when it does not exist.
pub fn load_config(path: &Path) -> Result<AgentConfig, ConfigError> {
    let config = if path.exists() {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?
    } else {
        AgentConfig::default()
    };
    config.validate()?;
    Ok(config)
}
