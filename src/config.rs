use std::time::Duration;

use crate::error::DnsError;

pub const DEFAULT_DNS_HOST: &str = "8.8.8.8";
pub const DEFAULT_DNS_PORT: u16 = 53;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Settings for one run of the client, fixed once built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub host: String,
    pub authoritative_only: bool,
    pub verbose: bool,
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: DEFAULT_DNS_PORT,
            host: DEFAULT_DNS_HOST.to_string(),
            authoritative_only: false,
            verbose: false,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Config {
    pub fn new(
        port: u16,
        host: impl Into<String>,
        authoritative_only: bool,
        verbose: bool,
    ) -> Result<Self, DnsError> {
        let host = host.into();

        if port < 1 {
            return Err(DnsError::Config("Invalid value for dns-port".to_string()));
        }
        if host.trim().is_empty() {
            return Err(DnsError::Config("Missing value for dns-host".to_string()));
        }

        Ok(Config {
            port,
            host,
            authoritative_only,
            verbose,
            ..Default::default()
        })
    }

    /// Destination in `host:port` form
    pub fn server_addr(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            // Bare IPv6 literal
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}
