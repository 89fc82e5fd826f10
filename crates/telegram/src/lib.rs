//! A small client for the parts of the Telegram Bot API the bot needs: long
//! polling for updates and replying with text, keyboards and photos.

use thiserror::Error;

pub mod client;
pub mod model;

pub use client::{TelegramClient, TelegramCredentials};

#[derive(Debug, Error)]
pub enum TelegramError {
    /// The request never produced a usable response. The request url is
    /// stripped, it contains the bot token.
    #[error("request to the bot api failed: {0}")]
    Http(#[source] reqwest::Error),
    #[error("bot api rejected {method} ({code:?}): {description}")]
    Api {
        method: &'static str,
        code: Option<i64>,
        description: String,
    },
}

impl From<reqwest::Error> for TelegramError {
    fn from(why: reqwest::Error) -> Self {
        Self::Http(why.without_url())
    }
}

pub type Result<T> = std::result::Result<T, TelegramError>;
