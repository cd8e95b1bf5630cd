use crate::domain::payload::NotificationPayload;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Priority {
    #[default]
    High,
    Normal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushType {
    Alert,
    Background,
}

/// Request headers that travel alongside the payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushOptions {
    pub apns_id: Option<String>,
    pub priority: Priority,
    pub expiration: Option<u64>,
    pub collapse_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PushRequest {
    pub device_token: String,
    pub topic: String,
    pub payload: NotificationPayload,
    pub options: PushOptions,
}

impl PushRequest {
    pub fn new(device_token: impl Into<String>, topic: impl Into<String>, payload: NotificationPayload) -> Self {
        Self { device_token: device_token.into(), topic: topic.into(), payload, options: PushOptions::default() }
    }

    #[must_use]
    pub fn with_options(mut self, options: PushOptions) -> Self {
        self.options = options;
        self
    }

    /// A push with no visible alert that only wakes the app is a background push.
    pub fn push_type(&self) -> PushType {
        let aps = &self.payload.aps;
        let has_alert = aps.alert.as_ref().is_some_and(|a| !a.is_empty());
        if aps.content_available && !has_alert && aps.badge.is_none() {
            PushType::Background
        } else {
            PushType::Alert
        }
    }

    /// APNs rejects background pushes sent at high priority.
    pub fn effective_priority(&self) -> Priority {
        match self.push_type() {
            PushType::Background => Priority::Normal,
            PushType::Alert => self.options.priority,
        }
    }

    /// Short token prefix safe to put in logs.
    pub fn token_prefix(&self) -> String {
        self.device_token.chars().take(8).collect()
    }
}

/// Outcome reported by APNs for one push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushResult {
    pub status_code: u16,
    pub apns_id: String,
    pub reason: String,
}

impl PushResult {
    pub const STATUS_OK: u16 = 200;

    pub const fn is_success(&self) -> bool {
        self.status_code == Self::STATUS_OK
    }
}

impl fmt::Display for PushResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.status_code, self.apns_id, self.reason)
    }
}
