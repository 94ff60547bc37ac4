use crate::dns::forwarding::MessageBuilder;
use crate::dns::transport::tcp::send_with_length_prefix;
use async_trait::async_trait;
use ferrous_relay_application::ports::ResponseSink;
use ferrous_relay_domain::DomainError;
use hickory_proto::op::Message;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::AsyncWrite;
use tokio::net::UdpSocket;

/// Replies with one datagram to the peer, truncated to its payload limit.
pub struct UdpResponseSink {
    socket: Arc<UdpSocket>,
    peer: SocketAddr,
    max_payload: usize,
}

impl UdpResponseSink {
    pub fn new(socket: Arc<UdpSocket>, peer: SocketAddr, max_payload: usize) -> Self {
        Self {
            socket,
            peer,
            max_payload,
        }
    }
}

#[async_trait]
impl ResponseSink for UdpResponseSink {
    async fn write(&mut self, response: &Message) -> Result<(), DomainError> {
        let bytes = MessageBuilder::serialize_for_udp(response, self.max_payload)
            .map_err(|e| DomainError::ResponseWrite(e.to_string()))?;

        self.socket
            .send_to(&bytes, self.peer)
            .await
            .map_err(|e| DomainError::ResponseWrite(format!("{}: {}", self.peer, e)))?;

        Ok(())
    }
}

/// Replies with one length-prefixed message on a client stream.
pub struct TcpResponseSink<W> {
    writer: W,
}

impl<W> TcpResponseSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

#[async_trait]
impl<W> ResponseSink for TcpResponseSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn write(&mut self, response: &Message) -> Result<(), DomainError> {
        let bytes = MessageBuilder::serialize_message(response)
            .map_err(|e| DomainError::ResponseWrite(e.to_string()))?;

        send_with_length_prefix(&mut self.writer, &bytes)
            .await
            .map_err(|e| DomainError::ResponseWrite(e.to_string()))
    }
}
