//! Configuration management for chapterwatch.
//!
//! Configuration is read from `~/.config/chapterwatch/config.toml` at
//! startup. If the file doesn't exist, a default configuration with
//! comments is created. Missing fields fall back to defaults, so partial
//! files work.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Override for the SQLite database path (default: platform data dir).
    pub database_path: Option<PathBuf>,
    /// Discord webhook receiving new-chapter notifications.
    pub discord_webhook: Option<String>,
    pub http: HttpConfig,
    pub watch: WatchConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// User agent sent with every page fetch.
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: concat!(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) ",
                "AppleWebKit/537.36 (KHTML, like Gecko) ",
                "Chrome/111.0.0.0 Safari/537.36"
            )
            .to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Seconds to wait before retrying after a failed check.
    pub retry_backoff_secs: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            retry_backoff_secs: 30,
        }
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with
    /// comments. If it exists but is invalid, returns an error.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: config_path,
            source: e,
        })?;

        Ok(config)
    }

    /// Get the default config file path: `~/.config/chapterwatch/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("chapterwatch").join("config.toml"))
    }

    /// Webhook from config, falling back to the `DISCORD_WH` environment
    /// variable.
    pub fn webhook_url(&self) -> Option<String> {
        self.discord_webhook
            .clone()
            .or_else(|| std::env::var("DISCORD_WH").ok())
            .filter(|url| !url.is_empty())
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_secs(self.watch.retry_backoff_secs)
    }

    fn create_default_config(path: &PathBuf) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let default_config = Self::default_config_content();

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.clone(),
            source: e,
        })?;

        file.write_all(default_config.as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.clone(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# chapterwatch configuration

# Where the SQLite database lives. Defaults to the platform data dir,
# e.g. ~/.local/share/chapterwatch/chapterwatch.db
# database_path = "/path/to/chapterwatch.db"

# Discord webhook receiving new-chapter notifications. When unset, the
# DISCORD_WH environment variable is used; with neither, notifications
# only go to the log.
# discord_webhook = "https://discord.com/api/webhooks/..."

[http]
# Request timeout in seconds
timeout_secs = 10

# User agent sent with every page fetch
user_agent = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/111.0.0.0 Safari/537.36"

[watch]
# Seconds to wait before retrying after a failed check
retry_backoff_secs = 30
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
