use apns_oneshot::adapters::certificate::load_credential;
use apns_oneshot::domain::credential::{ApnsEnvironment, CertificateSource};
use apns_oneshot::error::CertificateError;
use openssl::asn1::Asn1Time;
use openssl::pkey::PKey;

mod common;

fn source(pem: Vec<u8>, password: &str) -> CertificateSource {
    CertificateSource { pem, password: password.to_string(), environment: ApnsEnvironment::Development }
}

#[test]
fn test_load_encrypted_bundle() {
    common::setup_tracing();
    let credential = load_credential(&source(common::encrypted_bundle(), common::CERT_PASSWORD)).unwrap();

    assert_eq!(credential.environment, ApnsEnvironment::Development);
    assert_eq!(credential.subject, format!("Apple Push Services: {}", common::TOPIC));
    assert!(!credential.not_after.is_empty());

    // The key handed to the TLS client must be usable without the password.
    let key = PKey::private_key_from_pem(&credential.private_key_pem).unwrap();
    assert_eq!(key.bits(), 2048);
    assert!(String::from_utf8(credential.private_key_pem.clone()).unwrap().contains("BEGIN PRIVATE KEY"));
}

#[test]
fn test_load_unencrypted_bundle_ignores_password() {
    let key = common::generate_key();
    let cert = common::valid_certificate(&key);
    let pem = common::pem_bundle(&cert, &key, "");

    assert!(load_credential(&source(pem.clone(), "")).is_ok());
    assert!(load_credential(&source(pem, "unused")).is_ok());
}

#[test]
fn test_wrong_password() {
    let err = load_credential(&source(common::encrypted_bundle(), "not-the-password")).unwrap_err();
    assert!(matches!(err, CertificateError::Password), "unexpected error: {err}");
}

#[test]
fn test_missing_password_for_encrypted_key() {
    let err = load_credential(&source(common::encrypted_bundle(), "")).unwrap_err();
    assert!(matches!(err, CertificateError::Password), "unexpected error: {err}");
}

#[test]
fn test_missing_private_key_block() {
    let key = common::generate_key();
    let cert = common::valid_certificate(&key);

    let err = load_credential(&source(cert.to_pem().unwrap(), "")).unwrap_err();
    assert!(matches!(err, CertificateError::Pem("PRIVATE KEY")));
}

#[test]
fn test_missing_certificate_block() {
    let key = common::generate_key();
    let err = load_credential(&source(key.private_key_to_pem_pkcs8().unwrap(), "")).unwrap_err();
    assert!(matches!(err, CertificateError::Pem("CERTIFICATE")));
}

#[test]
fn test_key_from_another_certificate() {
    let cert = common::valid_certificate(&common::generate_key());
    let other_key = common::generate_key();
    let pem = common::pem_bundle(&cert, &other_key, common::CERT_PASSWORD);

    let err = load_credential(&source(pem, common::CERT_PASSWORD)).unwrap_err();
    assert!(matches!(err, CertificateError::KeyMismatch));
}

#[test]
fn test_expired_certificate_still_loads() {
    common::setup_tracing();
    let key = common::generate_key();
    let cert =
        common::certificate_for(&key, &Asn1Time::from_unix(0).unwrap(), &Asn1Time::from_unix(86_400).unwrap());
    let pem = common::pem_bundle(&cert, &key, common::CERT_PASSWORD);

    let credential = load_credential(&source(pem, common::CERT_PASSWORD)).unwrap();
    assert!(credential.not_after.contains("1970"));
}
