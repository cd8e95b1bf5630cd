use crate::domain::credential::{ApnsEnvironment, CertificateSource};
use crate::domain::message::MessageTemplate;
use crate::domain::push::{Priority, PushOptions};
use crate::error::{AppError, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use clap::{Args, Parser, ValueEnum};
use serde::Deserialize;
use serde_json::Value;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// APNs topic, usually the app bundle identifier
    #[arg(long, env = "TOPIC")]
    pub topic: String,

    /// Hex device token of the target app installation
    #[arg(long, env = "DEVICE_TOKEN")]
    pub device_token: Option<String>,

    #[command(flatten)]
    pub credentials: CredentialConfig,

    #[command(flatten)]
    pub message: MessageConfig,

    #[command(flatten)]
    pub delivery: DeliveryConfig,

    #[command(flatten)]
    pub telemetry: TelemetryConfig,
}

#[derive(Clone, Debug, Default, Args)]
pub struct CredentialConfig {
    /// Base64 encoded JSON with `passwd_of_pem`, `push_certificate` and `apns_environment`
    #[arg(long, env = "APNS", hide_env_values = true)]
    pub apns: Option<String>,

    /// Path to a PEM file holding the push certificate and its private key
    #[arg(long, env = "APNS_CERT_PATH")]
    pub cert_path: Option<PathBuf>,

    /// Password protecting the private key in the PEM file
    #[arg(long, env = "APNS_CERT_PASSWORD", default_value = "", hide_env_values = true)]
    pub cert_password: String,

    /// APNs environment for the PEM file: PRODUCTION or DEVELOPMENT
    #[arg(long, env = "APNS_ENVIRONMENT")]
    pub environment: Option<String>,
}

/// Shape of the `APNS` blob once decoded.
#[derive(Deserialize)]
struct ApnsBlob {
    #[serde(default)]
    passwd_of_pem: String,
    #[serde(default)]
    push_certificate: String,
    #[serde(default)]
    apns_environment: String,
}

impl CredentialConfig {
    /// Turns the configured inputs into raw certificate material.
    ///
    /// # Errors
    /// Returns `AppError::Config` if no source is configured or the configured one cannot be decoded.
    pub fn resolve(&self) -> Result<CertificateSource> {
        if let Some(blob) = self.apns.as_deref().filter(|b| !b.trim().is_empty()) {
            return Self::from_blob(blob);
        }

        let Some(path) = &self.cert_path else {
            return Err(AppError::config("APNS or APNS_CERT_PATH must be set"));
        };
        let pem = std::fs::read(path)
            .map_err(|e| AppError::config(format!("cannot read certificate {}: {e}", path.display())))?;
        if pem.iter().all(u8::is_ascii_whitespace) {
            return Err(AppError::config(format!("certificate file {} is empty", path.display())));
        }
        let environment = self
            .environment
            .as_deref()
            .ok_or_else(|| AppError::config("APNS_ENVIRONMENT must be set when using APNS_CERT_PATH"))?
            .parse()?;

        Ok(CertificateSource { pem, password: self.cert_password.clone(), environment })
    }

    fn from_blob(blob: &str) -> Result<CertificateSource> {
        let trimmed = blob.trim();
        let json = if trimmed.starts_with('{') {
            trimmed.as_bytes().to_vec()
        } else {
            STANDARD.decode(trimmed).map_err(|e| AppError::config(format!("cannot decode APNS config: {e}")))?
        };

        let parsed: ApnsBlob =
            serde_json::from_slice(&json).map_err(|e| AppError::config(format!("invalid APNS config: {e}")))?;

        if parsed.push_certificate.trim().is_empty() {
            return Err(AppError::config("APNS config has no push_certificate"));
        }
        let environment: ApnsEnvironment = parsed.apns_environment.parse()?;

        Ok(CertificateSource {
            pem: parsed.push_certificate.into_bytes(),
            password: parsed.passwd_of_pem,
            environment,
        })
    }
}

#[derive(Clone, Debug, Default, Args)]
pub struct MessageConfig {
    /// JSON file describing the message (title, body, silent, data, ...)
    #[arg(long, env = "MESSAGE_FILE")]
    pub message_file: Option<PathBuf>,

    /// Alert title
    #[arg(long, env = "TITLE")]
    pub title: Option<String>,

    /// Alert body
    #[arg(long, env = "BODY")]
    pub body: Option<String>,

    /// Mark the push as content-available (background refresh)
    #[arg(long, env = "SILENT")]
    pub silent: bool,

    /// Badge count shown on the app icon
    #[arg(long, env = "BADGE")]
    pub badge: Option<u32>,

    /// Sound name; "default" when unset
    #[arg(long, env = "SOUND")]
    pub sound: Option<String>,

    /// Let a notification service extension modify the push
    #[arg(long, env = "MUTABLE_CONTENT")]
    pub mutable_content: bool,

    /// Custom `key=value` field; JSON values are kept structured
    #[arg(long = "data", value_name = "KEY=VALUE", value_parser = parse_data_entry)]
    pub data: Vec<(String, Value)>,
}

fn parse_data_entry(raw: &str) -> std::result::Result<(String, Value), String> {
    let (key, value) = raw.split_once('=').ok_or_else(|| format!("expected KEY=VALUE, got {raw:?}"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err("custom data key cannot be empty".into());
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_owned()));
    Ok((key.to_owned(), value))
}

impl MessageConfig {
    /// Merges the message file (if any) with the flags; flags win.
    ///
    /// # Errors
    /// Returns `AppError::Config` if the message file cannot be read or parsed.
    pub fn template(&self) -> Result<MessageTemplate> {
        let mut msg = match &self.message_file {
            Some(path) => {
                let raw = std::fs::read(path)
                    .map_err(|e| AppError::config(format!("cannot read message file {}: {e}", path.display())))?;
                serde_json::from_slice(&raw)
                    .map_err(|e| AppError::config(format!("invalid message file {}: {e}", path.display())))?
            }
            None => MessageTemplate::default(),
        };

        if let Some(title) = &self.title {
            msg.title.clone_from(title);
        }
        if let Some(body) = &self.body {
            msg.body.clone_from(body);
        }
        msg.silent |= self.silent;
        msg.mutable_content |= self.mutable_content;
        if self.badge.is_some() {
            msg.badge = self.badge;
        }
        if self.sound.is_some() {
            msg.sound.clone_from(&self.sound);
        }
        for (key, value) in &self.data {
            msg.data.insert(key.clone(), value.clone());
        }
        Ok(msg)
    }
}

#[derive(Clone, Debug, Args)]
pub struct DeliveryConfig {
    /// Delivery priority for alert pushes
    #[arg(long, env = "APNS_PRIORITY", value_enum, default_value_t = Priority::High)]
    pub priority: Priority,

    /// UNIX timestamp after which APNs stops trying to deliver
    #[arg(long, env = "APNS_EXPIRATION")]
    pub expiration: Option<u64>,

    /// Canonical UUID identifying the notification
    #[arg(long, env = "APNS_ID")]
    pub apns_id: Option<String>,

    /// Identifier used to coalesce multiple notifications into one
    #[arg(long, env = "APNS_COLLAPSE_ID")]
    pub collapse_id: Option<String>,

    /// Timeout for the push request in seconds
    #[arg(long, env = "APNS_REQUEST_TIMEOUT_SECS", default_value_t = 20)]
    pub request_timeout_secs: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            priority: Priority::High,
            expiration: None,
            apns_id: None,
            collapse_id: None,
            request_timeout_secs: 20,
        }
    }
}

impl DeliveryConfig {
    /// Builds request options, preferring the configured id over the message's own.
    ///
    /// # Errors
    /// Returns `AppError::Config` if the notification id is not a UUID.
    pub fn options(&self, message_id: Option<&str>) -> Result<PushOptions> {
        let apns_id = match self.apns_id.as_deref().or(message_id) {
            Some(id) => Some(
                Uuid::parse_str(id)
                    .map_err(|e| AppError::config(format!("apns-id {id:?} is not a UUID: {e}")))?
                    .hyphenated()
                    .to_string(),
            ),
            None => None,
        };

        Ok(PushOptions {
            apns_id,
            priority: self.priority,
            expiration: self.expiration,
            collapse_id: self.collapse_id.clone(),
        })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Debug, Default, Args)]
pub struct TelemetryConfig {
    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// OTLP collector endpoint; telemetry export is disabled when unset
    #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,
}

impl Config {
    /// Applies a local `.env` file, if any, then parses flags and environment.
    ///
    /// # Errors
    /// Returns `AppError::Config` if a `.env` file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        check_env_file(dotenvy::dotenv().map(|_| ()))?;
        Ok(Self::parse())
    }

    /// Device token from the flags, falling back to the message file.
    ///
    /// # Errors
    /// Returns `AppError::Config` if no token is configured anywhere.
    pub fn resolve_device_token(&self, message: &MessageTemplate) -> Result<String> {
        self.device_token
            .as_deref()
            .or(message.device_id.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_owned)
            .ok_or_else(|| AppError::config("DEVICE_TOKEN must be set"))
    }
}

/// A missing `.env` file is fine; a broken one is not.
fn check_env_file(outcome: std::result::Result<(), dotenvy::Error>) -> Result<()> {
    match outcome {
        Ok(()) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(AppError::config(format!("cannot load .env file: {e}"))),
    }
}
