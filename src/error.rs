use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProbeError>;

/// Every way a probe run can end early. All of them are terminal for the binary.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("one or more required fields are missing: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("error creating x509 keypair from client cert file {cert_path} and client key file {key_path}: {source}")]
    CredentialLoad {
        cert_path: String,
        key_path: String,
        source: KeyPairError,
    },

    #[error("error opening CA file {path}: {source}")]
    CaTrustLoad { path: String, source: io::Error },

    #[error("unable to create http request for {target}: {source}")]
    InvalidRequest {
        target: String,
        source: url::ParseError,
    },

    #[error("url error received on http request: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("unexpected error received: {0}")]
    Unexpected(#[source] reqwest::Error),

    #[error("unexpected error reading response body: {0}")]
    BodyRead(#[source] reqwest::Error),
}

/// Why a certificate/key pair could not become a client identity.
#[derive(Error, Debug)]
pub enum KeyPairError {
    #[error("cannot read {path}: {source}")]
    Io { path: String, source: io::Error },

    #[error("malformed PEM in {path}: {source}")]
    Pem { path: String, source: io::Error },

    #[error("no certificate found in {0}")]
    NoCertificate(String),

    #[error("no private key found in {0}")]
    NoPrivateKey(String),

    #[error("{0}")]
    Rejected(#[from] rustls::Error),
}

impl ProbeError {
    pub(crate) fn credential(cert_path: &str, key_path: &str, source: KeyPairError) -> Self {
        Self::CredentialLoad {
            cert_path: cert_path.to_string(),
            key_path: key_path.to_string(),
            source,
        }
    }

    /// Errors that carry the request URL come from the transport; the rest are unexpected.
    pub(crate) fn from_send(e: reqwest::Error) -> Self {
        if e.url().is_some() {
            Self::Transport(e)
        } else {
            Self::Unexpected(e)
        }
    }
}
