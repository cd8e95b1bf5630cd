use crate::domain::payload::{Alert, Aps, NotificationPayload};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Caller-facing description of a notification, before it is shaped into an APNs payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageTemplate {
    pub notification_id: Option<String>,
    pub device_id: Option<String>,
    pub title: String,
    pub body: String,
    pub silent: bool,
    pub badge: Option<u32>,
    pub sound: Option<String>,
    pub mutable_content: bool,
    pub data: BTreeMap<String, Value>,
}

impl MessageTemplate {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self { title: title.into(), body: body.into(), ..Self::default() }
    }

    /// Location update message: fixed title, the content as body and as a `content` field.
    pub fn location(content: &str) -> Self {
        let mut msg = Self::new("t", content);
        msg.data.insert("content".into(), Value::String(content.to_owned()));
        msg
    }

    #[must_use]
    pub const fn silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    #[must_use]
    pub fn with_data(mut self, key: impl Into<String>, value: Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    /// Builds the APNs payload for this message.
    ///
    /// # Errors
    /// Returns `AppError::Config` if the resulting payload fails validation.
    pub fn messaging(&self) -> Result<NotificationPayload> {
        let alert = Alert::new(self.title.clone(), self.body.clone());
        let aps = Aps {
            alert: (!alert.is_empty()).then_some(alert),
            badge: self.badge,
            sound: self.sound.clone(),
            content_available: self.silent,
            mutable_content: self.mutable_content,
        };

        let payload = NotificationPayload::new(aps).with_custom_data(self.data.clone());
        payload.validate()?;
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_messaging_copies_alert_verbatim() {
        let payload = MessageTemplate::new("Hello  ", "ünïcödé body\n").messaging().unwrap();
        let alert = payload.aps.alert.unwrap();
        assert_eq!(alert.title, "Hello  ");
        assert_eq!(alert.body, "ünïcödé body\n");
    }

    #[test]
    fn test_content_available_follows_silent_flag() {
        let loud = MessageTemplate::new("t", "b").messaging().unwrap();
        assert!(!loud.aps.content_available);

        let quiet = MessageTemplate::new("t", "b").silent(true).messaging().unwrap();
        assert!(quiet.aps.content_available);
    }

    #[test]
    fn test_location_message() {
        let payload = MessageTemplate::location("t").messaging().unwrap();
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            json!({
                "aps": {"alert": {"title": "t", "body": "t"}, "sound": "default"},
                "content": "t"
            })
        );
    }

    #[test]
    fn test_empty_message_is_rejected() {
        let err = MessageTemplate::default().messaging().unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_silent_message_without_alert() {
        let payload = MessageTemplate::default().silent(true).with_data("sync", json!(true)).messaging().unwrap();
        assert!(payload.aps.alert.is_none());
        assert_eq!(payload.custom_data["sync"], json!(true));
    }

    #[test]
    fn test_silent_message_with_empty_alert_omits_alert_key() {
        let payload = MessageTemplate::new("", "").silent(true).messaging().unwrap();
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value, json!({"aps": {"sound": "default", "content-available": 1}}));
    }

    #[test]
    fn test_template_from_json() {
        let msg: MessageTemplate = serde_json::from_value(json!({
            "notification_id": "8c4f2a6e-3b1d-4e5f-9a0b-1c2d3e4f5a6b",
            "device_id": "abc",
            "title": "Hi",
            "body": "There",
            "data": {"room": 12}
        }))
        .unwrap();
        assert_eq!(msg.device_id.as_deref(), Some("abc"));
        assert!(!msg.silent);
        assert_eq!(msg.data["room"], json!(12));
    }
}
