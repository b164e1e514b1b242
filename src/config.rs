//! Bridge configuration stored as TOML in the user's config directory

use crate::state::ControllerType;
use crate::sync::SyncSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

const CONFIG_DIR_NAME: &str = "procon-bridge";
const CONFIG_FILE_NAME: &str = "config.toml";

/// One day; longer stats intervals are rejected
pub const MAX_STATS_INTERVAL_SECS: u64 = 86_400;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("No config directory available on this platform")]
    NoConfigDir,

    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct BridgeConfig {
    /// Controller type the session emulates
    pub controller: ControllerType,
    /// Optional cap on sync ticks per second
    pub max_tick_rate_hz: Option<u32>,
    /// Stops the loop after this many seconds
    pub run_duration_secs: Option<u64>,
    pub stats_interval_secs: u64,
    /// Stop the loop when Enter is pressed
    pub watch_stdin: bool,
    pub connect_delay_ms: u64,
    pub report_buffer: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            controller: ControllerType::ProController,
            max_tick_rate_hz: None,
            run_duration_secs: None,
            stats_interval_secs: 30,
            watch_stdin: true,
            connect_delay_ms: 0,
            report_buffer: 16,
        }
    }
}

impl BridgeConfig {
    /// `<config_dir>/procon-bridge/config.toml`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_tick_rate_hz == Some(0) {
            return Err(ConfigError::Invalid(
                "max_tick_rate_hz must be greater than zero".to_string(),
            ));
        }
        if self.stats_interval_secs == 0 || self.stats_interval_secs > MAX_STATS_INTERVAL_SECS {
            return Err(ConfigError::Invalid(format!(
                "stats_interval_secs must be between 1 and {}",
                MAX_STATS_INTERVAL_SECS
            )));
        }
        if self.report_buffer == 0 {
            return Err(ConfigError::Invalid(
                "report_buffer must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let config: BridgeConfig = toml::from_str(&content)?;
        config.validate()?;
        debug!("Loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    pub async fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_error = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
        }
        let content = toml::to_string_pretty(self)?;
        tokio::fs::write(path, content).await.map_err(io_error)?;
        Ok(())
    }

    /// Loads the config, writing the defaults first when the file is missing
    pub async fn load_or_create(path: &Path) -> Result<Self, ConfigError> {
        let exists = tokio::fs::try_exists(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        if !exists {
            info!("No config at {}, writing defaults", path.display());
            let config = BridgeConfig::default();
            config.save(path).await?;
            return Ok(config);
        }
        Self::load(path).await
    }

    pub fn sync_settings(&self) -> SyncSettings {
        SyncSettings {
            max_tick_rate_hz: self.max_tick_rate_hz,
            stats_interval_secs: self.stats_interval_secs,
        }
    }

    pub fn run_duration(&self) -> Option<Duration> {
        self.run_duration_secs.map(Duration::from_secs)
    }

    pub fn connect_delay(&self) -> Duration {
        Duration::from_millis(self.connect_delay_ms)
    }
}
