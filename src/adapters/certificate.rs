use crate::domain::credential::{CertificateSource, Credential};
use crate::error::CertificateError;
use openssl::asn1::Asn1Time;
use openssl::nid::Nid;
use openssl::pkey::{PKey, Private};
use openssl::x509::X509;
use std::cmp::Ordering;

const CERTIFICATE_LABEL: &str = "-----BEGIN CERTIFICATE-----";
const KEY_LABEL: &str = "PRIVATE KEY-----";

/// Parses a PEM bundle (certificate followed by its private key) into a client credential.
///
/// The private key may be encrypted; `password` is ignored for unencrypted keys.
///
/// # Errors
/// Returns `CertificateError` if a block is missing, the password is wrong, or the key
/// does not match the certificate.
#[tracing::instrument(level = "debug", skip_all, fields(environment = %source.environment))]
pub fn load_credential(source: &CertificateSource) -> Result<Credential, CertificateError> {
    let pem = source.pem.as_slice();
    let text = String::from_utf8_lossy(pem);
    if !text.contains(CERTIFICATE_LABEL) {
        return Err(CertificateError::Pem("CERTIFICATE"));
    }
    if !text.contains(KEY_LABEL) {
        return Err(CertificateError::Pem("PRIVATE KEY"));
    }

    let cert = X509::from_pem(pem)?;
    let key = decrypt_key(pem, &source.password)?;

    if !cert.public_key()?.public_eq(&key) {
        return Err(CertificateError::KeyMismatch);
    }

    let subject = cert
        .subject_name()
        .entries_by_nid(Nid::COMMONNAME)
        .next()
        .map(|entry| entry.data().to_string())
        .transpose()?
        .unwrap_or_default();
    let not_after = cert.not_after().to_string();

    let now = Asn1Time::days_from_now(0)?;
    if cert.not_after().compare(&now)? == Ordering::Less {
        tracing::warn!(subject = %subject, not_after = %not_after, "Push certificate has expired");
    } else {
        tracing::debug!(subject = %subject, not_after = %not_after, "Loaded push certificate");
    }

    Ok(Credential {
        certificate_pem: cert.to_pem()?,
        private_key_pem: key.private_key_to_pem_pkcs8()?,
        environment: source.environment,
        subject,
        not_after,
    })
}

// Always pass a passphrase so OpenSSL never falls back to prompting on the terminal.
fn decrypt_key(pem: &[u8], password: &str) -> Result<PKey<Private>, CertificateError> {
    PKey::private_key_from_pem_passphrase(pem, password.as_bytes()).map_err(|_| CertificateError::Password)
}
