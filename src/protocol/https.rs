use crate::domain::{ProbeConfig, ProbeResponse};
use crate::protocol::tls;
use crate::{ProbeError, Result};
use reqwest::Client;
use rustls::ClientConfig;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Covers connect, handshake and reading the body.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
pub const REQUEST_BODY: &str = "World";

pub fn build_client(tls_config: ClientConfig) -> Result<Client> {
    Client::builder()
        .use_preconfigured_tls(tls_config)
        .timeout(REQUEST_TIMEOUT)
        .no_proxy()
        .build()
        .map_err(ProbeError::Unexpected)
}

pub fn target_url(server_host: &str) -> Result<Url> {
    let target = format!("https://{}", server_host);
    Url::parse(&target).map_err(|source| ProbeError::InvalidRequest { target, source })
}

/// Sends the one GET and buffers the whole body.
///
/// The response is consumed by the body read, so its connection is released
/// whether or not the read succeeds.
pub async fn fetch(client: &Client, server_host: &str) -> Result<ProbeResponse> {
    let url = target_url(server_host)?;
    debug!("Sending GET {}", url);

    let response = client
        .get(url)
        .body(REQUEST_BODY)
        .send()
        .await
        .map_err(ProbeError::from_send)?;

    let version = response.version();
    let status = response.status();
    debug!("Received {:?} {}", version, status);

    let body = response.bytes().await.map_err(ProbeError::BodyRead)?;

    Ok(ProbeResponse {
        version,
        status,
        body: body.to_vec(),
    })
}

pub async fn run(config: &ProbeConfig) -> Result<ProbeResponse> {
    let tls_config = tls::build_tls_context(config)?;
    let client = build_client(tls_config)?;
    info!("Probing https://{}", config.server_host);
    fetch(&client, &config.server_host).await
}
