#![allow(dead_code)]

use mtls_probe::domain::ProbeConfig;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::server::WebPkiClientVerifier;
use rustls::{RootCertStore, ServerConfig};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tokio_rustls::TlsAcceptor;

pub fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

pub fn config_for(server_host: &str) -> ProbeConfig {
    ProbeConfig {
        server_host: server_host.to_string(),
        ca_cert_path: fixture("ca.pem"),
        client_cert_path: fixture("client.pem"),
        client_key_path: fixture("client.key"),
    }
}

fn certs(name: &str) -> Vec<CertificateDer<'static>> {
    let pem = std::fs::read(fixture(name)).unwrap();
    rustls_pemfile::certs(&mut pem.as_slice())
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

fn key(name: &str) -> PrivateKeyDer<'static> {
    let pem = std::fs::read(fixture(name)).unwrap();
    rustls_pemfile::private_key(&mut pem.as_slice()).unwrap().unwrap()
}

/// Server side of the fixtures: presents `server.pem` and demands a client
/// certificate signed by `ca.pem`.
fn server_config() -> ServerConfig {
    let provider = Arc::new(rustls::crypto::ring::default_provider());

    let mut roots = RootCertStore::empty();
    for cert in certs("ca.pem") {
        roots.add(cert).unwrap();
    }
    let verifier = WebPkiClientVerifier::builder_with_provider(Arc::new(roots), provider.clone())
        .build()
        .unwrap();

    ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .unwrap()
        .with_client_cert_verifier(verifier)
        .with_single_cert(certs("server.pem"), key("server.key"))
        .unwrap()
}

pub struct TestServer {
    pub addr: SocketAddr,
    /// Raw bytes of every request that completed a handshake.
    pub requests: UnboundedReceiver<Vec<u8>>,
}

impl TestServer {
    pub fn host(&self) -> String {
        self.addr.to_string()
    }
}

/// Answers every request with `200 OK` and `body`, then closes the connection.
pub async fn spawn_mtls_server(body: &'static [u8]) -> TestServer {
    let mut response = format!(
        "HTTP/1.1 200 OK\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
        body.len()
    )
    .into_bytes();
    response.extend_from_slice(body);

    spawn_server(Some(response)).await
}

/// Answers every request with exactly `response`, then closes the connection.
pub async fn spawn_raw_mtls_server(response: &[u8]) -> TestServer {
    spawn_server(Some(response.to_vec())).await
}

/// Completes the handshake and reads the request but never answers.
pub async fn spawn_silent_mtls_server() -> TestServer {
    spawn_server(None).await
}

async fn spawn_server(response: Option<Vec<u8>>) -> TestServer {
    let acceptor = TlsAcceptor::from(Arc::new(server_config()));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (request_tx, requests) = unbounded_channel();
    let response = Arc::new(response);

    tokio::spawn(async move {
        while let Ok((tcp, _)) = listener.accept().await {
            let acceptor = acceptor.clone();
            let request_tx = request_tx.clone();
            let response = response.clone();
            tokio::spawn(async move {
                let Ok(mut stream) = acceptor.accept(tcp).await else {
                    return;
                };

                let request = read_request(&mut stream).await;
                let _ = request_tx.send(request);

                match response.as_deref() {
                    Some(response) => {
                        let _ = stream.write_all(response).await;
                        let _ = stream.shutdown().await;
                    }
                    None => std::future::pending::<()>().await,
                }
            });
        }
    });

    TestServer { addr, requests }
}

async fn read_request<S: AsyncRead + Unpin>(stream: &mut S) -> Vec<u8> {
    let mut request = Vec::new();
    let mut chunk = [0u8; 1024];

    loop {
        let n = match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        request.extend_from_slice(&chunk[..n]);

        if let Some(head_end) = find(&request, b"\r\n\r\n") {
            let expected = head_end + 4 + content_length(&request[..head_end]);
            if request.len() >= expected {
                break;
            }
        }
    }

    request
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn content_length(head: &[u8]) -> usize {
    String::from_utf8_lossy(head)
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse().ok())
        .unwrap_or(0)
}

/// Splits a captured request into its head and body.
pub fn split_request(request: &[u8]) -> (String, Vec<u8>) {
    match find(request, b"\r\n\r\n") {
        Some(end) => (
            String::from_utf8_lossy(&request[..end]).into_owned(),
            request[end + 4..].to_vec(),
        ),
        None => (String::from_utf8_lossy(request).into_owned(), Vec::new()),
    }
}
