use async_trait::async_trait;
use ferrous_relay_domain::DomainError;
use hickory_proto::op::Message;

/// Where a finished reply goes, typically the client socket the query came from.
#[async_trait]
pub trait ResponseSink: Send {
    async fn write(&mut self, response: &Message) -> Result<(), DomainError>;
}
