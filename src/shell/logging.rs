use crate::shell::LogLevel;
use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

/// Diagnostics go to stderr so stdout only ever carries usage or the report.
pub fn init_tracing(level: &LogLevel) {
    let log_config = format!("mtls_probe={}", level);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_config))
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();
}
