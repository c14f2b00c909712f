//! Raw DNS transports.
//!
//! A transport sends one encoded request to the resolver and returns the
//! encoded reply. Every call opens a fresh socket, so a transport holds no
//! connection state and can be owned by a single worker.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, UdpSocket};

use crate::config::UDP_RECEIVE_BUFFER;
use crate::dns::message::Protocol;
use crate::error_handling::TransportError;

/// Sends raw DNS messages over the wire.
#[async_trait]
pub trait DnsTransport: Send + Sync {
    /// Performs one request/reply exchange, bounded by `timeout`.
    async fn exchange(&self, request: &[u8], timeout: Duration)
        -> Result<Vec<u8>, TransportError>;

    fn protocol(&self) -> Protocol;
}

/// DNS over UDP, one ephemeral socket per exchange.
pub struct UdpTransport {
    server: SocketAddr,
}

impl UdpTransport {
    pub fn new(server: SocketAddr) -> Self {
        Self { server }
    }

    fn io_error(&self, source: std::io::Error) -> TransportError {
        TransportError::Io {
            protocol: Protocol::Udp.as_str(),
            server: self.server,
            source,
        }
    }

    async fn send_and_receive(&self, request: &[u8]) -> Result<Vec<u8>, TransportError> {
        let bind_addr = if self.server.is_ipv4() {
            SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))
        } else {
            SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))
        };

        let socket = UdpSocket::bind(bind_addr)
            .await
            .map_err(|e| self.io_error(e))?;
        socket
            .connect(self.server)
            .await
            .map_err(|e| self.io_error(e))?;
        socket.send(request).await.map_err(|e| self.io_error(e))?;

        let mut buf = vec![0u8; UDP_RECEIVE_BUFFER];
        loop {
            let len = socket.recv(&mut buf).await.map_err(|e| self.io_error(e))?;
            // Skip datagrams whose message id does not match the request
            if len >= 2 && request.len() >= 2 && buf[..2] == request[..2] {
                buf.truncate(len);
                return Ok(buf);
            }
            log::trace!(
                "Ignoring {} byte datagram from {} with mismatched id",
                len,
                self.server
            );
        }
    }
}

#[async_trait]
impl DnsTransport for UdpTransport {
    async fn exchange(
        &self,
        request: &[u8],
        timeout: Duration,
    ) -> Result<Vec<u8>, TransportError> {
        tokio::time::timeout(timeout, self.send_and_receive(request))
            .await
            .map_err(|_| TransportError::Timeout {
                protocol: Protocol::Udp.as_str(),
                server: self.server,
                timeout,
            })?
    }

    fn protocol(&self) -> Protocol {
        Protocol::Udp
    }
}

/// DNS over TCP with the two-byte length prefix, one connection per exchange.
pub struct TcpTransport {
    server: SocketAddr,
}

impl TcpTransport {
    pub fn new(server: SocketAddr) -> Self {
        Self { server }
    }

    fn io_error(&self, source: std::io::Error) -> TransportError {
        TransportError::Io {
            protocol: Protocol::Tcp.as_str(),
            server: self.server,
            source,
        }
    }

    async fn send_and_receive(&self, request: &[u8]) -> Result<Vec<u8>, TransportError> {
        let len = u16::try_from(request.len()).map_err(|_| {
            TransportError::Encode(format!(
                "request of {} bytes does not fit TCP framing",
                request.len()
            ))
        })?;

        let mut stream = TcpStream::connect(self.server)
            .await
            .map_err(|e| self.io_error(e))?;

        let mut framed = Vec::with_capacity(request.len() + 2);
        framed.extend_from_slice(&len.to_be_bytes());
        framed.extend_from_slice(request);
        stream
            .write_all(&framed)
            .await
            .map_err(|e| self.io_error(e))?;

        let mut len_buf = [0u8; 2];
        stream
            .read_exact(&mut len_buf)
            .await
            .map_err(|e| self.io_error(e))?;
        let mut reply = vec![0u8; usize::from(u16::from_be_bytes(len_buf))];
        stream
            .read_exact(&mut reply)
            .await
            .map_err(|e| self.io_error(e))?;

        Ok(reply)
    }
}

#[async_trait]
impl DnsTransport for TcpTransport {
    async fn exchange(
        &self,
        request: &[u8],
        timeout: Duration,
    ) -> Result<Vec<u8>, TransportError> {
        tokio::time::timeout(timeout, self.send_and_receive(request))
            .await
            .map_err(|_| TransportError::Timeout {
                protocol: Protocol::Tcp.as_str(),
                server: self.server,
                timeout,
            })?
    }

    fn protocol(&self) -> Protocol {
        Protocol::Tcp
    }
}
