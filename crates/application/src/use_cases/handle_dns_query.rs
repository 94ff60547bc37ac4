use super::assemble_response::response_skeleton;
use super::{InflightGuard, InflightRequests, ResponseAssembler};
use crate::ports::ResponseSink;
use crate::services::AuthorityDirectory;
use hickory_proto::op::{Message, ResponseCode};
use std::sync::Arc;
use tracing::{debug, error};

/// Entry point for every incoming query.
///
/// Never fails towards the listener: selection failures are logged and left
/// unanswered, upstream failures become NXDOMAIN replies, write failures are
/// logged and dropped.
pub struct HandleDnsQueryUseCase {
    directory: Arc<AuthorityDirectory>,
    assembler: ResponseAssembler,
    inflight: Arc<InflightRequests>,
}

impl HandleDnsQueryUseCase {
    pub fn new(directory: Arc<AuthorityDirectory>, assembler: ResponseAssembler) -> Self {
        Self {
            directory,
            assembler,
            inflight: Arc::new(InflightRequests::new()),
        }
    }

    pub fn inflight(&self) -> Arc<InflightRequests> {
        Arc::clone(&self.inflight)
    }

    /// Count a request as in flight from the moment it is accepted, before
    /// it is handed to a task.
    pub fn admit(&self) -> InflightGuard {
        self.inflight.enter()
    }

    pub async fn handle<S>(&self, query: &Message, sink: &mut S)
    where
        S: ResponseSink + ?Sized,
    {
        self.handle_admitted(query, sink, self.admit()).await;
    }

    /// Handle a query already counted by [`admit`](Self::admit); the
    /// request stops counting once this returns.
    pub async fn handle_admitted<S>(
        &self,
        query: &Message,
        sink: &mut S,
        _inflight: InflightGuard,
    ) where
        S: ResponseSink + ?Sized,
    {
        let Some(question) = query.queries().first() else {
            debug!(id = query.id(), "Query without question");
            let mut response = response_skeleton(query);
            response.set_response_code(ResponseCode::FormErr);
            Self::write(sink, &response).await;
            return;
        };

        let name = question.name().to_ascii();
        let domain = normalize_domain(&name);

        // No reply at all: the client is left to time out.
        let authority = match self.directory.select(&domain) {
            Ok(authority) => authority,
            Err(e) => {
                error!(domain = %domain, error = %e, "Unable to find authority");
                return;
            }
        };

        debug!(
            id = query.id(),
            domain = %domain,
            questions = query.queries().len(),
            authority = %authority,
            "Proxying query"
        );

        let response = self.assembler.assemble(query, authority).await;
        Self::write(sink, &response).await;
    }

    async fn write<S>(sink: &mut S, response: &Message)
    where
        S: ResponseSink + ?Sized,
    {
        if let Err(e) = sink.write(response).await {
            error!(id = response.id(), error = %e, "Unable to write response");
        }
    }
}

fn normalize_domain(domain: &str) -> &str {
    domain.trim_end_matches('.')
}
