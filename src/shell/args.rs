use crate::domain::ProbeConfig;
use crate::{ProbeError, Result};
use clap::{ArgAction, Parser, ValueEnum};
use std::ffi::OsString;
use std::fmt::Display;

pub const USAGE: &str = "usage:

mtls-probe -srvhost <host[:port]> -clientcert <clientCertificateFile> -cacert <caFile> -clientkey <clientPrivateKeyFile> [-help]

Options:
  -help          Optional, print this message
  -srvhost       Required, server address
  -clientcert    Required, client certificate
  -clientkey     Required, client private key
  -cacert        Required, CA that signed the server certificate
  -log-level     Optional, diagnostic verbosity (default: info)";

/// Flags that consume the following argument when no `=` is given.
const VALUE_FLAGS: [&str; 5] = ["srvhost", "cacert", "clientcert", "clientkey", "log-level"];

#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "mtls-probe", disable_help_flag = true, disable_version_flag = true)]
pub struct Args {
    /// Bare `-help` means true; `-help=true` and `-help=false` are accepted too.
    #[arg(
        long,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value = "false",
        default_missing_value = "true"
    )]
    pub help: bool,
    #[arg(long, allow_hyphen_values = true)]
    pub srvhost: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub cacert: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub clientcert: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub clientkey: Option<String>,
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

impl Args {
    /// Parses the process arguments, accepting `-flag` as well as `--flag`.
    pub fn parse_normalized() -> Self {
        Self::parse_from(normalize_args(std::env::args_os()))
    }

    pub fn into_config(self) -> Result<ProbeConfig> {
        let missing: Vec<&'static str> = [
            ("-srvhost", &self.srvhost),
            ("-cacert", &self.cacert),
            ("-clientcert", &self.clientcert),
            ("-clientkey", &self.clientkey),
        ]
        .into_iter()
        .filter(|(_, value)| value.as_deref().map_or(true, str::is_empty))
        .map(|(flag, _)| flag)
        .collect();

        if !missing.is_empty() {
            return Err(ProbeError::MissingFields(missing));
        }

        Ok(ProbeConfig {
            server_host: self.srvhost.unwrap_or_default(),
            ca_cert_path: self.cacert.unwrap_or_default(),
            client_cert_path: self.clientcert.unwrap_or_default(),
            client_key_path: self.clientkey.unwrap_or_default(),
        })
    }
}

/// Rewrites single-dash long flags (`-srvhost`) into clap's `--srvhost` form.
///
/// The first item is the program name and is left alone, as are flag values,
/// anything after a bare `--`, and arguments that are not valid UTF-8.
pub fn normalize_args<I, S>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    let mut args = args.into_iter().map(Into::into);
    let mut normalized: Vec<OsString> = args.next().into_iter().collect();
    let mut expecting_value = false;
    let mut passthrough = false;

    for arg in args {
        if passthrough || expecting_value {
            expecting_value = false;
            normalized.push(arg);
            continue;
        }

        let Some(text) = arg.to_str() else {
            normalized.push(arg);
            continue;
        };

        if text == "--" {
            passthrough = true;
            normalized.push(arg);
            continue;
        }

        let name = text.trim_start_matches('-');
        let dashes = text.len() - name.len();
        if dashes == 0 || name.is_empty() {
            normalized.push(arg);
            continue;
        }

        let (flag, has_value) = match name.split_once('=') {
            Some((flag, _)) => (flag, true),
            None => (name, false),
        };
        expecting_value = !has_value && VALUE_FLAGS.contains(&flag);

        if dashes == 1 && flag.len() > 1 {
            normalized.push(format!("--{name}").into());
        } else {
            normalized.push(arg);
        }
    }

    normalized
}
