use thiserror::Error;

#[derive(Error, Debug)]
pub enum CertificateError {
    #[error("PEM does not contain a {0} block")]
    Pem(&'static str),
    #[error("private key could not be decrypted with the supplied password")]
    Password,
    #[error("private key does not belong to the certificate")]
    KeyMismatch,
    #[error("TLS error: {0}")]
    Tls(#[from] openssl::error::ErrorStack),
}

#[derive(Error, Debug)]
pub enum PushError {
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Client error: {0}")]
    Client(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Certificate error: {0}")]
    Certificate(#[from] CertificateError),
    #[error("Push error: {0}")]
    Push(#[from] PushError),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// True for failures detected before any network activity.
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
