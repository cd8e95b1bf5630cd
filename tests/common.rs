#![allow(dead_code)]

use apns_oneshot::adapters::push::{PushError, PushProvider};
use apns_oneshot::config::Config;
use apns_oneshot::domain::push::{PushRequest, PushResult};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use clap::Parser;
use openssl::asn1::Asn1Time;
use openssl::bn::BigNum;
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkey::{PKey, Private};
use openssl::rsa::Rsa;
use openssl::symm::Cipher;
use openssl::x509::{X509, X509NameBuilder};
use std::sync::{Mutex, Once};

static INIT: Once = Once::new();

pub const TOPIC: &str = "com.example.app";
pub const DEVICE_TOKEN: &str = "a1b2c3d4e5f60718293a4b5c6d7e8f90a1b2c3d4e5f60718293a4b5c6d7e8f90";
pub const CERT_PASSWORD: &str = "pem-secret";

pub fn setup_tracing() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "warn".into())
            .add_directive("apns_oneshot=debug".parse().unwrap());

        tracing_subscriber::fmt().with_env_filter(filter).with_test_writer().init();
    });
}

pub fn generate_key() -> PKey<Private> {
    PKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap()
}

/// Self-signed certificate valid for `[not_before, not_after]`.
pub fn certificate_for(key: &PKey<Private>, not_before: &Asn1Time, not_after: &Asn1Time) -> X509 {
    let mut name = X509NameBuilder::new().unwrap();
    name.append_entry_by_nid(Nid::COMMONNAME, &format!("Apple Push Services: {TOPIC}")).unwrap();
    let name = name.build();

    let mut builder = X509::builder().unwrap();
    builder.set_version(2).unwrap();
    let serial = BigNum::from_u32(1).unwrap().to_asn1_integer().unwrap();
    builder.set_serial_number(&serial).unwrap();
    builder.set_subject_name(&name).unwrap();
    builder.set_issuer_name(&name).unwrap();
    builder.set_pubkey(key).unwrap();
    builder.set_not_before(not_before).unwrap();
    builder.set_not_after(not_after).unwrap();
    builder.sign(key, MessageDigest::sha256()).unwrap();
    builder.build()
}

pub fn valid_certificate(key: &PKey<Private>) -> X509 {
    certificate_for(key, &Asn1Time::days_from_now(0).unwrap(), &Asn1Time::days_from_now(365).unwrap())
}

/// Certificate followed by its private key encrypted with `password`.
pub fn pem_bundle(cert: &X509, key: &PKey<Private>, password: &str) -> Vec<u8> {
    let mut pem = cert.to_pem().unwrap();
    let key_pem = if password.is_empty() {
        key.private_key_to_pem_pkcs8().unwrap()
    } else {
        key.private_key_to_pem_pkcs8_passphrase(Cipher::aes_256_cbc(), password.as_bytes()).unwrap()
    };
    pem.extend_from_slice(&key_pem);
    pem
}

/// A valid encrypted bundle, as found in a real push certificate export.
pub fn encrypted_bundle() -> Vec<u8> {
    let key = generate_key();
    let cert = valid_certificate(&key);
    pem_bundle(&cert, &key, CERT_PASSWORD)
}

/// The `APNS` variable: base64 JSON holding the PEM, its password and the environment.
pub fn apns_blob(pem: &[u8], password: &str, environment: &str) -> String {
    let json = serde_json::json!({
        "passwd_of_pem": password,
        "push_certificate": String::from_utf8(pem.to_vec()).unwrap(),
        "apns_environment": environment,
    });
    STANDARD.encode(json.to_string())
}

pub fn config_from(args: &[&str]) -> Config {
    let mut argv = vec!["apns-oneshot", "--topic", TOPIC];
    argv.extend_from_slice(args);
    Config::try_parse_from(argv).unwrap()
}

/// Provider that records every request and answers with a fixed outcome.
#[derive(Debug)]
pub struct RecordingPushProvider {
    pub requests: Mutex<Vec<PushRequest>>,
    outcome: fn() -> Result<PushResult, PushError>,
}

impl RecordingPushProvider {
    pub fn answering(outcome: fn() -> Result<PushResult, PushError>) -> Self {
        Self { requests: Mutex::new(Vec::new()), outcome }
    }

    pub fn accepting() -> Self {
        Self::answering(|| {
            Ok(PushResult {
                status_code: 200,
                apns_id: "5e5a0c5e-0000-4000-8000-000000000001".into(),
                reason: String::new(),
            })
        })
    }

    pub fn sent(&self) -> Vec<PushRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PushProvider for RecordingPushProvider {
    async fn send(&self, request: &PushRequest) -> Result<PushResult, PushError> {
        self.requests.lock().unwrap().push(request.clone());
        (self.outcome)()
    }
}
