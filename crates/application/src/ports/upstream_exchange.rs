use async_trait::async_trait;
use ferrous_relay_domain::{Authority, DomainError};
use hickory_proto::op::{Message, Query};

#[async_trait]
pub trait UpstreamExchange: Send + Sync {
    /// Send a request carrying only `question` to `authority` and return the
    /// parsed upstream response.
    ///
    /// Transport failures, timeouts and malformed responses are all errors;
    /// no other authority is tried.
    async fn exchange(
        &self,
        question: &Query,
        authority: &Authority,
    ) -> Result<Message, DomainError>;
}
