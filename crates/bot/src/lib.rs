use std::time::Duration;

use utility::config::{self, ConfigError};

pub mod command;
pub mod dispatcher;
pub mod map;
pub mod polling;
pub mod session;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotSettings {
    /// How long a single `getUpdates` call may wait for new messages.
    pub poll_timeout: Duration,
    /// How long a command waits for the location share that completes it.
    pub session_timeout: Duration,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            poll_timeout: Duration::from_secs(30),
            session_timeout: Duration::from_secs(600),
        }
    }
}

impl BotSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            poll_timeout: Duration::from_secs(config::parsed_or(
                "TELEGRAM_POLL_TIMEOUT_SECS",
                defaults.poll_timeout.as_secs(),
            )?),
            session_timeout: Duration::from_secs(config::parsed_or(
                "SESSION_TIMEOUT_SECS",
                defaults.session_timeout.as_secs(),
            )?),
        })
    }
}
