use crate::error::AppError;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApnsEnvironment {
    Production,
    Development,
}

impl ApnsEnvironment {
    pub const fn host(self) -> &'static str {
        match self {
            Self::Production => "api.push.apple.com",
            Self::Development => "api.sandbox.push.apple.com",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Production => "PRODUCTION",
            Self::Development => "DEVELOPMENT",
        }
    }
}

impl FromStr for ApnsEnvironment {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PRODUCTION" => Ok(Self::Production),
            "DEVELOPMENT" => Ok(Self::Development),
            other => Err(AppError::config(format!(
                "unknown APNs environment {other:?} (expected PRODUCTION or DEVELOPMENT)"
            ))),
        }
    }
}

impl fmt::Display for ApnsEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw certificate material as read from configuration, before it is parsed.
#[derive(Clone)]
pub struct CertificateSource {
    pub pem: Vec<u8>,
    pub password: String,
    pub environment: ApnsEnvironment,
}

impl fmt::Debug for CertificateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CertificateSource")
            .field("pem_len", &self.pem.len())
            .field("password", &"<redacted>")
            .field("environment", &self.environment)
            .finish()
    }
}

/// Authenticated client identity: a certificate and its decrypted private key.
#[derive(Clone)]
pub struct Credential {
    pub certificate_pem: Vec<u8>,
    pub private_key_pem: Vec<u8>,
    pub environment: ApnsEnvironment,
    pub subject: String,
    pub not_after: String,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("subject", &self.subject)
            .field("not_after", &self.not_after)
            .field("environment", &self.environment)
            .field("private_key_pem", &"<redacted>")
            .finish_non_exhaustive()
    }
}
