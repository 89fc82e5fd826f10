use std::{fmt, time::Duration};

use serde::{de::DeserializeOwned, Serialize};
use utility::config::{self, ConfigError};

use crate::{
    model::{ApiResponse, GetUpdates, Message, ReplyMarkup, SendMessage, SendPhoto, Update},
    Result, TelegramError,
};

pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Extra time granted to a long poll request on top of the poll timeout.
const POLL_GRACE: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct TelegramCredentials {
    token: String,
}

impl TelegramCredentials {
    pub fn new<S: Into<String>>(token: S) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn from_env() -> std::result::Result<Self, ConfigError> {
        config::required("TELEGRAM_API_TOKEN").map(Self::new)
    }
}

impl fmt::Debug for TelegramCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramCredentials")
            .field("token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    base_url: String,
    credentials: TelegramCredentials,
}

impl TelegramClient {
    pub fn new(credentials: TelegramCredentials) -> Self {
        Self::with_base_url(credentials, TELEGRAM_API_URL)
    }

    pub fn with_base_url<S: Into<String>>(credentials: TelegramCredentials, base_url: S) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            credentials,
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.credentials.token, method)
    }

    async fn call<P, R>(&self, method: &'static str, params: &P, timeout: Duration) -> Result<R>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        log::trace!("calling {}", method);
        let response: ApiResponse<R> = self
            .http
            .post(self.method_url(method))
            .timeout(timeout)
            .json(params)
            .send()
            .await?
            .json()
            .await?;
        match response {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            ApiResponse {
                error_code,
                description,
                ..
            } => {
                log::debug!("{} failed with code {:?}", method, error_code);
                Err(TelegramError::Api {
                    method,
                    code: error_code,
                    description: description.unwrap_or_else(|| "no description".to_owned()),
                })
            }
        }
    }

    /// Long polls for new messages. `offset` is one past the last update id
    /// that was handled; passing it confirms those updates to telegram.
    pub async fn get_updates(&self, offset: Option<i64>, timeout_secs: u64) -> Result<Vec<Update>> {
        let params = GetUpdates {
            offset,
            timeout: timeout_secs,
            allowed_updates: vec!["message"],
        };
        self.call(
            "getUpdates",
            &params,
            Duration::from_secs(timeout_secs) + POLL_GRACE,
        )
        .await
    }

    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_markup: Option<&ReplyMarkup>,
    ) -> Result<Message> {
        let params = SendMessage {
            chat_id,
            text,
            reply_markup,
        };
        self.call("sendMessage", &params, REQUEST_TIMEOUT).await
    }

    /// Sends a photo by url; telegram downloads it itself.
    pub async fn send_photo(
        &self,
        chat_id: i64,
        photo_url: &str,
        reply_markup: Option<&ReplyMarkup>,
    ) -> Result<Message> {
        let params = SendPhoto {
            chat_id,
            photo: photo_url,
            reply_markup,
        };
        self.call("sendPhoto", &params, REQUEST_TIMEOUT).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_not_debug_printed() {
        let client = TelegramClient::new(TelegramCredentials::new("123:secret"));
        let printed = format!("{:?}", client);
        assert!(!printed.contains("secret"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn method_urls() {
        let client = TelegramClient::with_base_url(
            TelegramCredentials::new("123:abc"),
            "http://localhost:8081/",
        );
        assert_eq!(
            client.method_url("getUpdates"),
            "http://localhost:8081/bot123:abc/getUpdates"
        );
    }

    #[tokio::test]
    async fn unreachable_api_is_an_http_error_without_token() {
        let client = TelegramClient::with_base_url(
            TelegramCredentials::new("123:secret"),
            "http://127.0.0.1:1",
        );
        let error = client.send_message(1, "hi", None).await.unwrap_err();
        assert!(matches!(error, TelegramError::Http(_)));
        assert!(!error.to_string().contains("secret"));
    }
}
