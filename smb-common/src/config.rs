pub mod repost;
pub mod responses;
pub mod status;
pub mod voice_role;

use std::{fs::read_to_string, io::Error as IoError, path::Path};

use serde::Deserialize;
use thiserror::Error as ThisError;
use toml::de::Error as TomlError;

/// config.toml
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default = "Default::default")]
    pub responses: responses::ConfigResponses,

    #[serde(default = "Default::default")]
    pub status: status::ConfigStatus,

    pub voice_role: Option<voice_role::ConfigVoiceRole>,
    pub repost: Option<repost::ConfigRepost>,
}

pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let config_str = read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&config_str)
}

pub fn parse_config(config_str: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(config_str).map_err(ConfigError::Serialization)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// 0 秒の間隔はループを空回りさせるので受け付けない。
    fn validate(&self) -> Result<(), ConfigError> {
        let durations = [
            ("responses.refresh_interval_seconds", self.responses.refresh_interval_seconds),
            ("responses.timeout_seconds", self.responses.timeout_seconds),
            ("status.interval_seconds", self.status.interval_seconds),
        ];
        for (name, seconds) in durations {
            if seconds == 0 {
                return Err(ConfigError::ZeroDuration(name));
            }
        }
        Ok(())
    }
}

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(IoError),

    #[error("serialization error: {0}")]
    Serialization(TomlError),

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
}
