#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::todo)]
#![warn(clippy::panic)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(unreachable_pub)]
#![warn(missing_debug_implementations)]
#![warn(unused_qualifications)]
#![deny(unused_must_use)]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;
pub mod telemetry;

use crate::adapters::push::{ApnsPushProvider, PushProvider};
use crate::config::{Config, DeliveryConfig};
use crate::domain::credential::Credential;
use crate::domain::push::{PushRequest, PushResult};
use crate::error::Result;
use crate::services::push_service::PushService;
use std::sync::Arc;
use tracing::Instrument;

/// Builds the real APNs provider for a loaded credential.
///
/// # Errors
/// Returns `AppError::Push` if the client cannot be constructed.
pub fn connect_apns(credential: &Credential, delivery: &DeliveryConfig) -> Result<Arc<dyn PushProvider>> {
    let provider = ApnsPushProvider::new(credential, delivery.request_timeout_secs)?;
    Ok(Arc::new(provider))
}

/// Assembles the request from configuration alone. Touches neither the certificate nor the network.
///
/// # Errors
/// Returns `AppError::Config` if the message, device token or delivery options are invalid.
pub fn build_request(config: &Config) -> Result<PushRequest> {
    let message = config.message.template()?;
    let payload = message.messaging()?;
    let device_token = config.resolve_device_token(&message)?;
    let options = config.delivery.options(message.notification_id.as_deref())?;

    Ok(PushRequest::new(device_token, config.topic.clone(), payload).with_options(options))
}

/// Runs one send: request, credential, provider, dispatch.
///
/// `connect` is only called once everything local has been validated, so configuration
/// mistakes never reach the network.
///
/// # Errors
/// Returns the first configuration, certificate or push error encountered.
pub async fn run<F>(config: &Config, connect: F) -> Result<PushResult>
where
    F: FnOnce(&Credential, &DeliveryConfig) -> Result<Arc<dyn PushProvider>>,
{
    let span = tracing::info_span!("send_push", topic = %config.topic);
    async {
        let request = build_request(config)?;

        let source = config.credentials.resolve()?;
        let credential = adapters::certificate::load_credential(&source)?;

        let provider = connect(&credential, &config.delivery)?;
        PushService::new(provider).dispatch(&request).await
    }
    .instrument(span)
    .await
}
