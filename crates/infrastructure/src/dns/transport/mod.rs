pub mod tcp;
pub mod udp;

use async_trait::async_trait;
use ferrous_relay_domain::{DomainError, Protocol};
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug)]
pub struct TransportResponse {
    pub bytes: Vec<u8>,

    pub protocol_used: &'static str,
}

/// One request/response exchange with an upstream server, over a fresh
/// socket or connection.
#[async_trait]
pub trait DnsTransport: Send + Sync {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError>;
}

pub enum Transport {
    Udp(udp::UdpTransport),
    Tcp(tcp::TcpTransport),
}

impl Transport {
    pub async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        match self {
            Self::Udp(t) => DnsTransport::send(t, message_bytes, timeout).await,
            Self::Tcp(t) => DnsTransport::send(t, message_bytes, timeout).await,
        }
    }
}

pub fn create_transport(protocol: Protocol, addr: SocketAddr) -> Transport {
    match protocol {
        Protocol::Udp => Transport::Udp(udp::UdpTransport::new(addr)),
        Protocol::Tcp => Transport::Tcp(tcp::TcpTransport::new(addr)),
    }
}
