use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration from config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// The bot's own user ID (e.g. `@standupbot:example.org`)
    pub username: String,
    /// Where flows and settings are saved on shutdown
    #[serde(default)]
    pub state_file: Option<PathBuf>,
    #[serde(default)]
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Base delay of the Fibonacci backoff
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Retries after the first attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        RetryConfig {
            base_delay_ms: default_base_delay_ms(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_max_retries() -> u32 {
    5
}
