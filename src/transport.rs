use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

use tracing::debug;

use crate::config::Config;
use crate::error::DnsError;

/// Largest classic UDP DNS message
pub const MAX_UDP_MESSAGE: usize = 512;

/// Moves datagrams between the client and a DNS server
pub trait Transport {
    fn send(&mut self, buf: &[u8]) -> Result<(), DnsError>;

    fn receive(&mut self, max_size: usize) -> Result<Vec<u8>, DnsError>;
}

/// UDP socket connected to the configured server
pub struct UdpTransport {
    socket: UdpSocket,
    server: SocketAddr,
}

impl UdpTransport {
    /// Bind an ephemeral local port and connect it to `host:port`
    pub fn connect(config: &Config) -> Result<Self, DnsError> {
        let server = config
            .server_addr()
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no address found for {}", config.host),
                )
            })?;

        let bind_addr = if server.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(bind_addr)?;
        socket.connect(server)?;
        socket.set_read_timeout(Some(config.timeout))?;

        debug!(%server, local = %socket.local_addr()?, "udp transport ready");

        Ok(Self { socket, server })
    }
}

impl Transport for UdpTransport {
    fn send(&mut self, buf: &[u8]) -> Result<(), DnsError> {
        let sent = self.socket.send(buf)?;
        if sent != buf.len() {
            return Err(DnsError::Transport(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("sent {} of {} bytes", sent, buf.len()),
            )));
        }
        debug!(server = %self.server, bytes = sent, "sent query");
        Ok(())
    }

    fn receive(&mut self, max_size: usize) -> Result<Vec<u8>, DnsError> {
        let mut buf = vec![0u8; max_size];
        let size = self.socket.recv(&mut buf)?;
        buf.truncate(size);
        debug!(server = %self.server, bytes = size, "received response");
        Ok(buf)
    }
}
