use crate::adapters::push::PushProvider;
use crate::domain::payload::MAX_PAYLOAD_BYTES;
use crate::domain::push::{PushRequest, PushResult};
use crate::error::Result;
use opentelemetry::{
    KeyValue, global,
    metrics::{Counter, Histogram},
};
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone, Debug)]
struct Metrics {
    sent: Counter<u64>,
    rejected: Counter<u64>,
    errors: Counter<u64>,
    duration_seconds: Histogram<f64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("apns-oneshot");
        Self {
            sent: meter
                .u64_counter("apns_push_sent_total")
                .with_description("Pushes accepted by APNs")
                .build(),
            rejected: meter
                .u64_counter("apns_push_rejected_total")
                .with_description("Pushes answered by APNs with a non-success status")
                .build(),
            errors: meter
                .u64_counter("apns_push_errors_total")
                .with_description("Pushes that never got an answer from APNs")
                .build(),
            duration_seconds: meter
                .f64_histogram("apns_push_duration_seconds")
                .with_description("Time from request to APNs answer")
                .build(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PushService {
    provider: Arc<dyn PushProvider>,
    metrics: Metrics,
}

impl PushService {
    pub fn new(provider: Arc<dyn PushProvider>) -> Self {
        Self { provider, metrics: Metrics::new() }
    }

    /// Sends a single notification. There is no retry: the first answer is the answer.
    ///
    /// # Errors
    /// Returns `AppError::Config` if the payload cannot be serialized, or `AppError::Push`
    /// if the provider fails before APNs answers.
    #[tracing::instrument(
        skip(self, request),
        fields(token = %request.token_prefix(), topic = %request.topic, status = tracing::field::Empty),
        err
    )]
    pub async fn dispatch(&self, request: &PushRequest) -> Result<PushResult> {
        let body = request.payload.to_bytes()?;
        if body.len() > MAX_PAYLOAD_BYTES {
            tracing::warn!(size = body.len(), limit = MAX_PAYLOAD_BYTES, "Payload exceeds the APNs size limit");
        } else {
            tracing::debug!(size = body.len(), "Payload serialized");
        }

        let start = Instant::now();
        let outcome = self.provider.send(request).await;
        self.metrics.duration_seconds.record(start.elapsed().as_secs_f64(), &[]);

        match outcome {
            Ok(result) => {
                tracing::Span::current().record("status", result.status_code);
                if result.is_success() {
                    self.metrics.sent.add(1, &[]);
                    tracing::info!(apns_id = %result.apns_id, "Push accepted by APNs");
                } else {
                    self.metrics.rejected.add(1, &[KeyValue::new("reason", result.reason.clone())]);
                    tracing::warn!(
                        status = result.status_code,
                        apns_id = %result.apns_id,
                        reason = %result.reason,
                        "Push rejected by APNs"
                    );
                }
                Ok(result)
            }
            Err(e) => {
                self.metrics.errors.add(1, &[]);
                Err(e.into())
            }
        }
    }
}
