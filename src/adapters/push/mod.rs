use crate::domain::push::{PushRequest, PushResult};
use async_trait::async_trait;

pub mod apns;

pub use crate::error::PushError;
pub use apns::ApnsPushProvider;

#[async_trait]
pub trait PushProvider: Send + Sync + std::fmt::Debug {
    /// Sends one notification and reports what APNs answered.
    ///
    /// A rejection by APNs is a successful call: the status and reason come back in the
    /// `PushResult`.
    ///
    /// # Errors
    /// Returns `PushError` if the request could not be built or never got a response.
    async fn send(&self, request: &PushRequest) -> Result<PushResult, PushError>;
}
