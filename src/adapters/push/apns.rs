use crate::adapters::push::{PushError, PushProvider};
use crate::domain::credential::{ApnsEnvironment, Credential};
use crate::domain::payload::NotificationPayload;
use crate::domain::push::{Priority, PushRequest, PushResult, PushType};
use a2::request::notification::{CollapseId, NotificationOptions};
use a2::request::payload::PayloadLike;
use a2::{Client, ClientConfig, Endpoint};
use async_trait::async_trait;
use serde::Serialize;

/// Sends through Apple's HTTP/2 gateway using certificate authentication.
pub struct ApnsPushProvider {
    client: Client,
    environment: ApnsEnvironment,
}

impl std::fmt::Debug for ApnsPushProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApnsPushProvider").field("environment", &self.environment).finish_non_exhaustive()
    }
}

impl ApnsPushProvider {
    /// Builds a client bound to the credential's environment.
    ///
    /// # Errors
    /// Returns `PushError::Client` if the TLS connector cannot be built from the credential.
    pub fn new(credential: &Credential, request_timeout_secs: u64) -> Result<Self, PushError> {
        let endpoint = match credential.environment {
            ApnsEnvironment::Production => Endpoint::Production,
            ApnsEnvironment::Development => Endpoint::Sandbox,
        };

        let mut config = ClientConfig::new(endpoint);
        config.request_timeout_secs = Some(request_timeout_secs);

        let client = Client::certificate_parts(&credential.certificate_pem, &credential.private_key_pem, config)
            .map_err(|e| PushError::Client(format!("failed to initialize APNs client: {e}")))?;

        tracing::info!(
            subject = %credential.subject,
            environment = %credential.environment,
            host = credential.environment.host(),
            "Initialized APNs client"
        );

        Ok(Self { client, environment: credential.environment })
    }
}

/// Hands the domain payload to the client unchanged, so the wire body is exactly what
/// `NotificationPayload` serializes to.
#[derive(Debug, Serialize)]
struct WirePayload<'a> {
    #[serde(flatten)]
    payload: &'a NotificationPayload,
    #[serde(skip)]
    device_token: &'a str,
    #[serde(skip)]
    options: NotificationOptions<'a>,
}

impl PayloadLike for WirePayload<'_> {
    fn get_device_token(&self) -> &str {
        self.device_token
    }

    fn get_options(&self) -> &NotificationOptions<'_> {
        &self.options
    }
}

fn notification_options(request: &PushRequest) -> Result<NotificationOptions<'_>, PushError> {
    let collapse_id = request
        .options
        .collapse_id
        .as_deref()
        .map(CollapseId::new)
        .transpose()
        .map_err(|e| PushError::Client(format!("invalid collapse id: {e}")))?;

    Ok(NotificationOptions {
        apns_id: request.options.apns_id.as_deref(),
        apns_push_type: Some(match request.push_type() {
            PushType::Alert => a2::PushType::Alert,
            PushType::Background => a2::PushType::Background,
        }),
        apns_expiration: request.options.expiration,
        apns_priority: Some(match request.effective_priority() {
            Priority::High => a2::Priority::High,
            Priority::Normal => a2::Priority::Normal,
        }),
        apns_topic: Some(request.topic.as_str()),
        apns_collapse_id: collapse_id,
        ..Default::default()
    })
}

fn into_result(response: &a2::Response) -> PushResult {
    PushResult {
        status_code: response.code,
        apns_id: response.apns_id.clone().unwrap_or_default(),
        reason: response.error.as_ref().map_or_else(String::new, |body| format!("{:?}", body.reason)),
    }
}

#[async_trait]
impl PushProvider for ApnsPushProvider {
    async fn send(&self, request: &PushRequest) -> Result<PushResult, PushError> {
        let wire = WirePayload {
            payload: &request.payload,
            device_token: &request.device_token,
            options: notification_options(request)?,
        };

        match self.client.send(wire).await {
            Ok(response) => Ok(into_result(&response)),
            Err(a2::Error::ResponseError(response)) => Ok(into_result(&response)),
            Err(e) => Err(PushError::Transport(e.to_string())),
        }
    }
}
