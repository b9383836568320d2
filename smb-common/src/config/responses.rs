use std::time::Duration;

use serde::Deserialize;
use url::Url;

const DEFAULT_RESPONSES_URL: &str = "https://raw.githubusercontent.com/Crashbash-Kun/shankmods-bot/master/responses.json";

/// [responses]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConfigResponses {
    #[serde(default = "default_url")]
    pub url: Url,

    #[serde(default = "default_refresh_interval_seconds")]
    pub refresh_interval_seconds: u64,

    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl ConfigResponses {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_seconds)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for ConfigResponses {
    fn default() -> ConfigResponses {
        ConfigResponses {
            url: default_url(),
            refresh_interval_seconds: default_refresh_interval_seconds(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

fn default_url() -> Url {
    Url::parse(DEFAULT_RESPONSES_URL).expect("default URL must be valid")
}

fn default_refresh_interval_seconds() -> u64 {
    150
}

fn default_timeout_seconds() -> u64 {
    60
}
