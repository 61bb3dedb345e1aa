/// Validated settings for one probe run. Every field is non-empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProbeConfig {
    pub server_host: String,
    pub ca_cert_path: String,
    pub client_cert_path: String,
    pub client_key_path: String,
}
