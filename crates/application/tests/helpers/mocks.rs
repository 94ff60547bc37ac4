use super::builders::answer_for;
use async_trait::async_trait;
use ferrous_relay_application::ports::{ResponseSink, UpstreamExchange};
use ferrous_relay_domain::{Authority, DomainError};
use hickory_proto::op::{Message, Query};
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Upstream answering A questions from a fixed table; unknown names time out.
pub struct MockUpstream {
    answers: HashMap<String, Vec<Ipv4Addr>>,
    delay: Duration,
    calls: AtomicUsize,
    calls_by_name: Mutex<HashMap<String, usize>>,
    contacted: Mutex<Vec<String>>,
}

impl MockUpstream {
    pub fn new() -> Self {
        Self {
            answers: HashMap::new(),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            calls_by_name: Mutex::new(HashMap::new()),
            contacted: Mutex::new(Vec::new()),
        }
    }

    pub fn with_answer(mut self, name: &str, ips: &[Ipv4Addr]) -> Self {
        self.answers.insert(name.to_string(), ips.to_vec());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn calls_for(&self, name: &str) -> usize {
        self.calls_by_name
            .lock()
            .unwrap()
            .get(name)
            .copied()
            .unwrap_or(0)
    }

    /// Addresses of the authorities contacted, in call order.
    pub fn contacted(&self) -> Vec<String> {
        self.contacted.lock().unwrap().clone()
    }
}

impl Default for MockUpstream {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UpstreamExchange for MockUpstream {
    async fn exchange(
        &self,
        question: &Query,
        authority: &Authority,
    ) -> Result<Message, DomainError> {
        let name = question.name().to_ascii();

        self.calls.fetch_add(1, Ordering::SeqCst);
        *self
            .calls_by_name
            .lock()
            .unwrap()
            .entry(name.clone())
            .or_insert(0) += 1;
        self.contacted
            .lock()
            .unwrap()
            .push(authority.address.to_string());

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match self.answers.get(&name) {
            Some(ips) => Ok(answer_for(question, ips)),
            None => Err(DomainError::UpstreamTimeout {
                server: authority.endpoint(),
            }),
        }
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub responses: Vec<Message>,
}

#[async_trait]
impl ResponseSink for RecordingSink {
    async fn write(&mut self, response: &Message) -> Result<(), DomainError> {
        self.responses.push(response.clone());
        Ok(())
    }
}

pub struct FailingSink {
    pub attempts: usize,
}

#[async_trait]
impl ResponseSink for FailingSink {
    async fn write(&mut self, _response: &Message) -> Result<(), DomainError> {
        self.attempts += 1;
        Err(DomainError::ResponseWrite("connection closed".to_string()))
    }
}
