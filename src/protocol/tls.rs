use crate::domain::ProbeConfig;
use crate::{KeyPairError, ProbeError, Result};
use rustls::crypto::ring::sign::any_supported_type;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::sign::CertifiedKey;
use rustls::{ClientConfig, InconsistentKeys, RootCertStore};
use std::fs;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Client certificate chain and private key as read from disk, with the key
/// already checked against the leaf certificate.
pub struct ClientIdentity {
    cert_path: String,
    key_path: String,
    cert_chain: Vec<CertificateDer<'static>>,
    key: PrivateKeyDer<'static>,
}

impl ClientIdentity {
    pub fn cert_chain(&self) -> &[CertificateDer<'static>] {
        &self.cert_chain
    }
}

pub fn load_identity(cert_path: &str, key_path: &str) -> Result<ClientIdentity> {
    let fail = |source| ProbeError::credential(cert_path, key_path, source);

    let cert_pem = read_file(cert_path).map_err(fail)?;
    let key_pem = read_file(key_path).map_err(fail)?;

    let cert_chain = rustls_pemfile::certs(&mut cert_pem.as_slice())
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|source| {
            fail(KeyPairError::Pem {
                path: cert_path.to_string(),
                source,
            })
        })?;
    if cert_chain.is_empty() {
        return Err(fail(KeyPairError::NoCertificate(cert_path.to_string())));
    }

    let key = rustls_pemfile::private_key(&mut key_pem.as_slice())
        .map_err(|source| {
            fail(KeyPairError::Pem {
                path: key_path.to_string(),
                source,
            })
        })?
        .ok_or_else(|| fail(KeyPairError::NoPrivateKey(key_path.to_string())))?;

    let signing_key = any_supported_type(&key).map_err(|e| fail(e.into()))?;
    match CertifiedKey::new(cert_chain.clone(), signing_key).keys_match() {
        // key types whose public half ring cannot derive are left to the handshake
        Ok(()) | Err(rustls::Error::InconsistentKeys(InconsistentKeys::Unknown)) => {}
        Err(e) => return Err(fail(e.into())),
    }

    debug!(
        "Loaded client identity: {} certificate(s) from {}, key from {}",
        cert_chain.len(),
        cert_path,
        key_path
    );

    Ok(ClientIdentity {
        cert_path: cert_path.to_string(),
        key_path: key_path.to_string(),
        cert_chain,
        key,
    })
}

fn read_file(path: &str) -> std::result::Result<Vec<u8>, KeyPairError> {
    fs::read(path).map_err(|source| KeyPairError::Io {
        path: path.to_string(),
        source,
    })
}

/// Builds a trust pool from the PEM certificates in `ca_path`.
///
/// Only an unreadable file is an error. Unparsable sections and certificates the
/// pool refuses are skipped, so the pool may come back empty; the handshake is
/// what fails in that case.
pub fn load_trust_pool(ca_path: &str) -> Result<RootCertStore> {
    info!("CA file: {}", ca_path);

    let pem = fs::read(ca_path).map_err(|source| ProbeError::CaTrustLoad {
        path: ca_path.to_string(),
        source,
    })?;

    let mut parsed = Vec::new();
    for item in rustls_pemfile::certs(&mut pem.as_slice()) {
        match item {
            Ok(cert) => parsed.push(cert),
            Err(e) => {
                warn!("Skipped a malformed PEM section in {}: {}", ca_path, e);
            }
        }
    }

    let mut pool = RootCertStore::empty();
    let (added, ignored) = pool.add_parsable_certificates(parsed);
    if ignored > 0 {
        warn!("Ignored {} unusable certificate(s) in {}", ignored, ca_path);
    }
    if pool.is_empty() {
        warn!("No trusted certificates found in {}", ca_path);
    } else {
        debug!("Trust pool holds {} certificate(s)", added);
    }

    Ok(pool)
}

/// Binds the identity and the pool into one rustls client configuration.
///
/// A rejection from rustls here is reported like any other key pair failure.
pub fn client_config(identity: ClientIdentity, pool: RootCertStore) -> Result<ClientConfig> {
    let ClientIdentity {
        cert_path,
        key_path,
        cert_chain,
        key,
    } = identity;

    let provider = Arc::new(rustls::crypto::ring::default_provider());

    ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .and_then(|builder| {
            builder
                .with_root_certificates(pool)
                .with_client_auth_cert(cert_chain, key)
        })
        .map_err(|e| ProbeError::credential(&cert_path, &key_path, e.into()))
}

pub fn build_tls_context(config: &ProbeConfig) -> Result<ClientConfig> {
    let identity = load_identity(&config.client_cert_path, &config.client_key_path)?;
    let pool = load_trust_pool(&config.ca_cert_path)?;
    client_config(identity, pool)
}
