use crate::error::{AppError, Result};
use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Top-level key reserved for the Apple dictionary.
pub const APS_KEY: &str = "aps";

/// Sound played when none is configured.
pub const DEFAULT_SOUND: &str = "default";

/// Largest payload APNs accepts for a regular remote notification.
pub const MAX_PAYLOAD_BYTES: usize = 4096;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub body: String,
}

impl Alert {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self { title: title.into(), body: body.into() }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.body.is_empty()
    }
}

/// The Apple-defined `aps` dictionary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert: Option<Alert>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<u32>,
    #[serde(default, serialize_with = "serialize_sound")]
    pub sound: Option<String>,
    #[serde(
        rename = "content-available",
        default,
        skip_serializing_if = "is_false",
        serialize_with = "serialize_flag",
        deserialize_with = "deserialize_flag"
    )]
    pub content_available: bool,
    #[serde(
        rename = "mutable-content",
        default,
        skip_serializing_if = "is_false",
        serialize_with = "serialize_flag",
        deserialize_with = "deserialize_flag"
    )]
    pub mutable_content: bool,
}

impl Aps {
    /// Sound as it goes on the wire.
    pub fn effective_sound(&self) -> &str {
        self.sound.as_deref().filter(|s| !s.is_empty()).unwrap_or(DEFAULT_SOUND)
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_false(flag: &bool) -> bool {
    !*flag
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn serialize_flag<S: Serializer>(flag: &bool, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u8(u8::from(*flag))
}

fn serialize_sound<S: Serializer>(sound: &Option<String>, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(sound.as_deref().filter(|s| !s.is_empty()).unwrap_or(DEFAULT_SOUND))
}

fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Bool(b) => Ok(b),
        Value::Number(n) => match n.as_u64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(de::Error::custom(format!("invalid flag value {n}, expected 0 or 1"))),
        },
        other => Err(de::Error::custom(format!("invalid flag value {other}"))),
    }
}

/// Body of a single push: the `aps` dictionary plus custom keys flattened beside it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationPayload {
    pub aps: Aps,
    pub custom_data: BTreeMap<String, Value>,
}

impl NotificationPayload {
    pub const fn new(aps: Aps) -> Self {
        Self { aps, custom_data: BTreeMap::new() }
    }

    #[must_use]
    pub fn with_custom_data(mut self, data: BTreeMap<String, Value>) -> Self {
        self.custom_data = data;
        self
    }

    /// Checks that the payload carries something for the device to act on.
    ///
    /// # Errors
    /// Returns `AppError::Config` if the payload is empty or a custom key shadows `aps`.
    pub fn validate(&self) -> Result<()> {
        if self.custom_data.contains_key(APS_KEY) {
            return Err(AppError::config("custom data must not use the reserved \"aps\" key"));
        }

        let aps = &self.aps;
        let has_alert = aps.alert.as_ref().is_some_and(|a| !a.is_empty());
        if !has_alert
            && aps.badge.is_none()
            && !aps.content_available
            && !aps.mutable_content
            && self.custom_data.is_empty()
        {
            return Err(AppError::config("notification payload is empty"));
        }
        Ok(())
    }

    /// Serializes the payload to the JSON bytes sent as the request body.
    ///
    /// # Errors
    /// Returns `AppError::Config` if a custom value cannot be serialized.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| AppError::config(format!("cannot serialize payload: {e}")))
    }
}

impl Serialize for NotificationPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1 + self.custom_data.len()))?;
        map.serialize_entry(APS_KEY, &self.aps)?;
        for (key, value) in &self.custom_data {
            // validate() rejects this; never emit a second "aps" key
            if key != APS_KEY {
                map.serialize_entry(key, value)?;
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for NotificationPayload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let mut fields = BTreeMap::<String, Value>::deserialize(deserializer)?;
        let aps = fields.remove(APS_KEY).ok_or_else(|| de::Error::missing_field(APS_KEY))?;
        let aps = Aps::deserialize(aps).map_err(de::Error::custom)?;
        Ok(Self { aps, custom_data: fields })
    }
}
