//! DNS message codec
//!
//! Builds upstream requests and moves `hickory-proto` messages to and from
//! wire format.

use ferrous_relay_domain::DomainError;
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};

/// Largest UDP reply a client without EDNS(0) accepts (RFC 1035 §4.2.1)
pub const DEFAULT_UDP_PAYLOAD: usize = 512;

pub struct MessageBuilder;

impl MessageBuilder {
    /// Single-question recursive request for `question`.
    ///
    /// Creates a standard query with:
    /// - Random ID for request/response matching
    /// - RD (Recursion Desired) flag set
    /// - No EDNS record
    pub fn build_request(question: &Query) -> Message {
        let mut message = Message::new();
        message.set_id(fastrand::u16(..));
        message.set_message_type(MessageType::Query);
        message.set_op_code(OpCode::Query);
        message.set_recursion_desired(true);
        message.add_query(question.clone());
        message
    }

    /// Build a request and return both its ID and wire bytes
    pub fn build_query_with_id(question: &Query) -> Result<(u16, Vec<u8>), DomainError> {
        let message = Self::build_request(question);
        let bytes = Self::serialize_message(&message)?;
        Ok((message.id(), bytes))
    }

    pub fn parse_message(bytes: &[u8]) -> Result<Message, DomainError> {
        Message::from_vec(bytes).map_err(|e| {
            DomainError::InvalidDnsResponse(format!("Failed to parse DNS message: {}", e))
        })
    }

    /// Serialize a Message to wire format bytes
    pub fn serialize_message(message: &Message) -> Result<Vec<u8>, DomainError> {
        let mut buf = Vec::with_capacity(DEFAULT_UDP_PAYLOAD);
        let mut encoder = BinEncoder::new(&mut buf);

        message.emit(&mut encoder).map_err(|e| {
            DomainError::InvalidDomainName(format!("Failed to serialize DNS message: {}", e))
        })?;

        Ok(buf)
    }

    /// Wire form of `response` for a UDP client accepting `max_size` bytes.
    ///
    /// When the full reply does not fit, the record sections are dropped and
    /// the TC bit is set so the client retries over TCP.
    pub fn serialize_for_udp(response: &Message, max_size: usize) -> Result<Vec<u8>, DomainError> {
        let bytes = Self::serialize_message(response)?;
        if bytes.len() <= max_size {
            return Ok(bytes);
        }

        let mut truncated = response.clone();
        truncated.take_answers();
        truncated.take_name_servers();
        truncated.take_additionals();
        truncated.set_truncated(true);
        Self::serialize_message(&truncated)
    }

    /// UDP payload size the sender of `query` accepts.
    pub fn udp_payload_limit(query: &Message) -> usize {
        query
            .extensions()
            .as_ref()
            .map(|edns| usize::from(edns.max_payload()).max(DEFAULT_UDP_PAYLOAD))
            .unwrap_or(DEFAULT_UDP_PAYLOAD)
    }
}
