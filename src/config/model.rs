use serde::Deserialize;

use crate::relays::prelude::DEFAULT_RELAY_LIST_URL;

pub const DEFAULT_DOMAIN_SUFFIX: &str = "mullvad.net";
pub const DEFAULT_MAX_CONCURRENT_PINGS: usize = 10;
pub const DEFAULT_TIMEOUT_SECONDS: f64 = 5.0;
pub const DEFAULT_TCP_PORT: u16 = 443;
pub const DEFAULT_NEXT_FASTEST_COUNT: usize = 10;

/// How a single relay is measured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProbeMethod {
    /// One ICMP echo through the system ping tool
    #[default]
    Icmp,
    /// One TCP handshake to `tcp_port`
    Tcp,
}

/// The settings file for relayping.
/// Every key is optional and falls back to the built-in default.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Location of the provider's relay directory (JSON array of relays).
    #[serde(default = "default_relay_list_url")]
    pub relay_list_url: String,

    /// Appended to a relay hostname when the directory does not publish an FQDN.
    #[serde(default = "default_domain_suffix")]
    pub domain_suffix: String,

    /// The number of probes allowed in flight at once.
    #[serde(default = "default_max_concurrent_pings")]
    pub max_concurrent_pings: usize,

    /// Upper bound on one probe, in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: f64,

    #[serde(default)]
    pub probe_method: ProbeMethod,

    #[serde(default = "default_tcp_port")]
    pub tcp_port: u16,

    /// The ping executable, looked up on `PATH` when not absolute.
    #[serde(default = "default_ping_command")]
    pub ping_command: String,

    /// How many runners-up to show after the fastest relay.
    #[serde(default = "default_next_fastest_count")]
    pub next_fastest_count: usize,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            relay_list_url: default_relay_list_url(),
            domain_suffix: default_domain_suffix(),
            max_concurrent_pings: default_max_concurrent_pings(),
            timeout_seconds: default_timeout_seconds(),
            probe_method: ProbeMethod::default(),
            tcp_port: default_tcp_port(),
            ping_command: default_ping_command(),
            next_fastest_count: default_next_fastest_count(),
        }
    }
}

fn default_relay_list_url() -> String {
    DEFAULT_RELAY_LIST_URL.to_string()
}

fn default_domain_suffix() -> String {
    DEFAULT_DOMAIN_SUFFIX.to_string()
}

fn default_max_concurrent_pings() -> usize {
    DEFAULT_MAX_CONCURRENT_PINGS
}

fn default_timeout_seconds() -> f64 {
    DEFAULT_TIMEOUT_SECONDS
}

fn default_tcp_port() -> u16 {
    DEFAULT_TCP_PORT
}

fn default_ping_command() -> String {
    "ping".to_string()
}

fn default_next_fastest_count() -> usize {
    DEFAULT_NEXT_FASTEST_COUNT
}
