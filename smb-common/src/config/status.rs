use std::time::Duration;

use serde::Deserialize;

/// [status]
/// しばらくすると消えてしまうので定期的に設定し直す。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConfigStatus {
    #[serde(default = "default_text")]
    pub text: String,

    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u64,
}

impl ConfigStatus {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }
}

impl Default for ConfigStatus {
    fn default() -> ConfigStatus {
        ConfigStatus {
            text: default_text(),
            interval_seconds: default_interval_seconds(),
        }
    }
}

fn default_text() -> String {
    "Modding it up".to_string()
}

fn default_interval_seconds() -> u64 {
    300
}
