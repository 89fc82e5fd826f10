use serde::{Deserialize, Serialize};

/// Envelope of every bot api response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub error_code: Option<i64>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
    pub location: Option<Location>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    pub first_name: String,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReplyMarkup {
    Keyboard(ReplyKeyboardMarkup),
    Remove(ReplyKeyboardRemove),
}

impl ReplyMarkup {
    /// One time keyboard with a single button that shares the user's location.
    pub fn request_location<S: Into<String>>(label: S) -> Self {
        Self::Keyboard(ReplyKeyboardMarkup {
            keyboard: vec![vec![KeyboardButton {
                text: label.into(),
                request_location: Some(true),
            }]],
            resize_keyboard: true,
            one_time_keyboard: true,
        })
    }

    pub fn remove() -> Self {
        Self::Remove(ReplyKeyboardRemove {
            remove_keyboard: true,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplyKeyboardMarkup {
    pub keyboard: Vec<Vec<KeyboardButton>>,
    pub resize_keyboard: bool,
    pub one_time_keyboard: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplyKeyboardRemove {
    pub remove_keyboard: bool,
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyboardButton {
    pub text: String,
    pub request_location: Option<bool>,
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
pub(crate) struct GetUpdates {
    pub offset: Option<i64>,
    pub timeout: u64,
    pub allowed_updates: Vec<&'static str>,
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
pub(crate) struct SendMessage<'a> {
    pub chat_id: i64,
    pub text: &'a str,
    pub reply_markup: Option<&'a ReplyMarkup>,
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
pub(crate) struct SendPhoto<'a> {
    pub chat_id: i64,
    pub photo: &'a str,
    pub reply_markup: Option<&'a ReplyMarkup>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn decodes_location_update() {
        let body = json!({
            "ok": true,
            "result": [{
                "update_id": 817,
                "message": {
                    "message_id": 31,
                    "date": 1730533500,
                    "from": {"id": 4411, "is_bot": false, "first_name": "Sam"},
                    "chat": {"id": 4411, "type": "private"},
                    "location": {"latitude": 54.3233, "longitude": 10.1228}
                }
            }]
        });
        let response: ApiResponse<Vec<Update>> = serde_json::from_value(body).unwrap();
        assert!(response.ok);
        let updates = response.result.unwrap();
        let message = updates[0].message.as_ref().unwrap();
        assert_eq!(updates[0].update_id, 817);
        assert_eq!(message.from.as_ref().unwrap().id, 4411);
        assert_eq!(message.text, None);
        assert_eq!(message.location.unwrap().latitude, 54.3233);
    }

    #[test]
    fn decodes_error_response() {
        let body = json!({"ok": false, "error_code": 401, "description": "Unauthorized"});
        let response: ApiResponse<Vec<Update>> = serde_json::from_value(body).unwrap();
        assert!(!response.ok);
        assert_eq!(response.error_code, Some(401));
        assert!(response.result.is_none());
    }

    #[test]
    fn location_keyboard_shape() {
        let markup = serde_json::to_value(ReplyMarkup::request_location("Share Location"))
            .unwrap();
        assert_eq!(
            markup,
            json!({
                "keyboard": [[{"text": "Share Location", "request_location": true}]],
                "resize_keyboard": true,
                "one_time_keyboard": true
            })
        );
        assert_eq!(
            serde_json::to_value(ReplyMarkup::remove()).unwrap(),
            json!({"remove_keyboard": true})
        );
    }

    #[test]
    fn send_message_omits_missing_markup() {
        let body = serde_json::to_value(SendMessage {
            chat_id: 1,
            text: "hi",
            reply_markup: None,
        })
        .unwrap();
        assert_eq!(body, json!({"chat_id": 1, "text": "hi"}));
    }

    #[test]
    fn send_photo_carries_keyboard_removal() {
        let remove = ReplyMarkup::remove();
        let body = serde_json::to_value(SendPhoto {
            chat_id: 1,
            photo: "https://maps.test/1",
            reply_markup: Some(&remove),
        })
        .unwrap();
        assert_eq!(
            body,
            json!({
                "chat_id": 1,
                "photo": "https://maps.test/1",
                "reply_markup": {"remove_keyboard": true}
            })
        );
    }
}
