use std::net::SocketAddr;

use bot::{map::GoogleStaticMap, BotSettings};
use database::DatabaseConnectionInfo;
use telegram::TelegramCredentials;
use utility::config::{self, ConfigError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebConfig {
    pub bind_address: SocketAddr,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 8080)),
        }
    }
}

impl WebConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            bind_address: config::parsed_or("WEB_BIND_ADDRESS", Self::default().bind_address)?,
        })
    }
}

/// Everything read from the environment at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConnectionInfo,
    /// `None` runs the http api without the bot.
    pub telegram: Option<TelegramCredentials>,
    pub bot: BotSettings,
    /// `None` replies to `/traffic` with text instead of a map.
    pub map: Option<GoogleStaticMap>,
    pub web: WebConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let telegram = match TelegramCredentials::from_env() {
            Ok(credentials) => Some(credentials),
            Err(ConfigError::Missing(_)) => None,
            Err(why) => return Err(why),
        };
        Ok(Self {
            database: DatabaseConnectionInfo::from_env()?,
            telegram,
            bot: BotSettings::from_env()?,
            map: GoogleStaticMap::from_env(),
            web: WebConfig::from_env()?,
        })
    }
}
