use crate::ports::UpstreamExchange;
use crate::services::QueryCache;
use ferrous_relay_domain::Authority;
use hickory_proto::op::{Message, MessageType, ResponseCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Resolves every question of a query through the cache and merges the
/// per-question answers into one reply.
///
/// The first question that cannot be resolved stops the batch: the reply
/// keeps the answers gathered so far and carries NXDOMAIN.
pub struct ResponseAssembler {
    cache: Arc<QueryCache>,
    upstream: Arc<dyn UpstreamExchange>,
    cache_ttl: Duration,
}

impl ResponseAssembler {
    pub fn new(
        cache: Arc<QueryCache>,
        upstream: Arc<dyn UpstreamExchange>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            cache,
            upstream,
            cache_ttl,
        }
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    pub async fn assemble(&self, query: &Message, authority: &Authority) -> Message {
        let mut response = response_skeleton(query);

        for question in query.queries() {
            let result = self
                .cache
                .fetch_or_resolve(question, self.cache_ttl, || {
                    self.upstream.exchange(question, authority)
                })
                .await;

            match result {
                Ok(upstream) => {
                    debug!(
                        question = %question,
                        answers = upstream.answers().len(),
                        "Question resolved"
                    );
                    response.add_answers(upstream.answers().iter().cloned());
                }
                Err(e) => {
                    warn!(
                        question = %question,
                        authority = %authority,
                        error = %e,
                        "Upstream exchange failed"
                    );
                    response.set_response_code(ResponseCode::NXDomain);
                    break;
                }
            }
        }

        response
    }
}

/// Copy of the query turned into a reply: same id, opcode, flags, questions
/// and EDNS, no answers yet.
pub(crate) fn response_skeleton(query: &Message) -> Message {
    let mut response = query.clone();
    response.set_message_type(MessageType::Response);
    response.set_recursion_available(true);
    response.take_answers();
    response
}
