use tracing::{debug, info, warn};

use crate::config::Config;
use crate::dns_message::{build_query, parse_response, Message};
use crate::error::DnsError;
use crate::transport::{Transport, UdpTransport, MAX_UDP_MESSAGE};

/// DNS client that sends one query and decodes the reply
pub struct DnsClient<T: Transport> {
    config: Config,
    transport: T,
}

impl DnsClient<UdpTransport> {
    /// Create a client talking UDP to the configured server
    pub fn connect(config: Config) -> Result<Self, DnsError> {
        let transport = UdpTransport::connect(&config)?;
        Ok(Self::new(config, transport))
    }
}

impl<T: Transport> DnsClient<T> {
    pub fn new(config: Config, transport: T) -> Self {
        Self { config, transport }
    }

    /// Ask for the address of every host name in a single message
    pub fn query(&mut self, host_names: &[String]) -> Result<Message, DnsError> {
        let request = build_query(&self.config, host_names)?;
        let request_id = u16::from_be_bytes([request[0], request[1]]);

        info!(
            server = %self.config.server_addr(),
            hosts = ?host_names,
            "querying"
        );
        debug!(bytes = %hex(&request), "request");

        self.transport.send(&request)?;
        let response = self.transport.receive(MAX_UDP_MESSAGE)?;

        debug!(bytes = %hex(&response), "response");

        let message = parse_response(&response)?;

        if message.id != request_id {
            warn!(
                expected = request_id,
                received = message.id,
                "response transaction id does not match the query"
            );
        }

        if let Err(e) = message.status() {
            warn!(error = %e, "server did not return answers");
        }

        for question in &message.questions {
            debug!(%question, "question");
        }

        Ok(message)
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
