use super::MessageBuilder;
use crate::dns::transport::create_transport;
use async_trait::async_trait;
use ferrous_relay_application::ports::UpstreamExchange;
use ferrous_relay_domain::{Authority, DomainError, Protocol};
use hickory_proto::op::{Message, MessageType, Query};
use std::net::{IpAddr, SocketAddr};
use tracing::debug;

/// Forwards single questions to an authority over its configured protocol.
///
/// The authority timeout bounds the whole exchange: hostname lookup, the
/// first attempt and the TCP retry of a truncated UDP answer. Failures are
/// never retried against another authority.
#[derive(Debug, Default, Clone, Copy)]
pub struct UpstreamResolver;

impl UpstreamResolver {
    pub fn new() -> Self {
        Self
    }

    async fn resolve_addr(authority: &Authority) -> Result<SocketAddr, DomainError> {
        let host = authority
            .address
            .trim_start_matches('[')
            .trim_end_matches(']');

        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(SocketAddr::new(ip, authority.port));
        }

        let mut addrs = tokio::net::lookup_host((host, authority.port))
            .await
            .map_err(|e| DomainError::UpstreamTransport {
                server: authority.endpoint(),
                reason: format!("failed to resolve host: {}", e),
            })?;

        addrs.next().ok_or_else(|| DomainError::UpstreamTransport {
            server: authority.endpoint(),
            reason: "host resolved to no address".to_string(),
        })
    }

    async fn exchange_over(
        protocol: Protocol,
        server_addr: SocketAddr,
        question: &Query,
        authority: &Authority,
    ) -> Result<Message, DomainError> {
        let (id, bytes) = MessageBuilder::build_query_with_id(question)?;
        let transport = create_transport(protocol, server_addr);

        let response = transport.send(&bytes, authority.timeout).await?;
        let message = MessageBuilder::parse_message(&response.bytes)?;

        if message.id() != id {
            return Err(DomainError::InvalidDnsResponse(format!(
                "DNS ID mismatch from {}: expected {}, got {}",
                server_addr,
                id,
                message.id()
            )));
        }

        if message.message_type() != MessageType::Response {
            return Err(DomainError::InvalidDnsResponse(format!(
                "{} answered with a query message",
                server_addr
            )));
        }

        if message.queries() != std::slice::from_ref(question) {
            return Err(DomainError::InvalidDnsResponse(format!(
                "{} answered a different question than {}",
                server_addr, question
            )));
        }

        debug!(
            server = %server_addr,
            protocol = response.protocol_used,
            question = %question,
            rcode = ?message.response_code(),
            answers = message.answers().len(),
            "Upstream exchange complete"
        );

        Ok(message)
    }

    async fn exchange_with(
        question: &Query,
        authority: &Authority,
    ) -> Result<Message, DomainError> {
        let server_addr = Self::resolve_addr(authority).await?;
        let response =
            Self::exchange_over(authority.protocol, server_addr, question, authority).await?;

        if response.truncated() && authority.protocol == Protocol::Udp {
            debug!(
                server = %server_addr,
                question = %question,
                "Truncated UDP response, retrying over TCP"
            );
            return Self::exchange_over(Protocol::Tcp, server_addr, question, authority).await;
        }

        Ok(response)
    }
}

#[async_trait]
impl UpstreamExchange for UpstreamResolver {
    async fn exchange(
        &self,
        question: &Query,
        authority: &Authority,
    ) -> Result<Message, DomainError> {
        tokio::time::timeout(authority.timeout, Self::exchange_with(question, authority))
            .await
            .map_err(|_| DomainError::UpstreamTimeout {
                server: authority.endpoint(),
            })?
    }
}
