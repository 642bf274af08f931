use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::BotConfig;

/// Error type for reading config.toml
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("invalid username {0:?}: expected @localpart:server")]
    InvalidUsername(String),
}

/// Read and validate the bot config
pub fn read_config(path: &Path) -> Result<BotConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_config(&text)
}

/// Parse and validate config text
pub fn parse_config(text: &str) -> Result<BotConfig, ConfigError> {
    let config: BotConfig = toml::from_str(text)?;
    let valid = config
        .username
        .strip_prefix('@')
        .and_then(|rest| rest.split_once(':'))
        .is_some_and(|(local, server)| !local.is_empty() && !server.is_empty());
    if !valid {
        return Err(ConfigError::InvalidUsername(config.username));
    }
    Ok(config)
}
