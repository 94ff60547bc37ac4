use super::sink::UdpResponseSink;
use crate::dns::forwarding::MessageBuilder;
use ferrous_relay_application::use_cases::HandleDnsQueryUseCase;
use hickory_proto::op::MessageType;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const MAX_UDP_QUERY_SIZE: usize = 4096;

/// Receives datagrams and answers each query from its own task.
pub struct UdpDnsListener {
    socket: Arc<UdpSocket>,
    handler: Arc<HandleDnsQueryUseCase>,
}

impl UdpDnsListener {
    pub async fn bind(addr: SocketAddr, handler: Arc<HandleDnsQueryUseCase>) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        Ok(Self {
            socket: Arc::new(socket),
            handler,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Serves until `shutdown` is cancelled. Queries already dispatched keep
    /// running to completion.
    pub async fn run(self, shutdown: CancellationToken) {
        let local_addr = self.local_addr().ok();
        info!(bind_address = ?local_addr, "UDP listener started");

        let mut recv_buf = vec![0u8; MAX_UDP_QUERY_SIZE];

        loop {
            let (len, peer) = tokio::select! {
                _ = shutdown.cancelled() => break,
                received = self.socket.recv_from(&mut recv_buf) => match received {
                    Ok(received) => received,
                    Err(e) => {
                        warn!(error = %e, "UDP recv error");
                        continue;
                    }
                },
            };

            let query = match MessageBuilder::parse_message(&recv_buf[..len]) {
                Ok(query) if query.message_type() == MessageType::Query => query,
                Ok(_) => {
                    debug!(client = %peer, "Ignoring non-query datagram");
                    continue;
                }
                Err(e) => {
                    debug!(client = %peer, error = %e, "Dropping undecodable datagram");
                    continue;
                }
            };

            // Counted before spawning so shutdown waits for it even if the
            // task has not been polled yet.
            let inflight = self.handler.admit();
            let handler = Arc::clone(&self.handler);
            let socket = Arc::clone(&self.socket);
            tokio::spawn(async move {
                let max_payload = MessageBuilder::udp_payload_limit(&query);
                let mut sink = UdpResponseSink::new(socket, peer, max_payload);
                handler.handle_admitted(&query, &mut sink, inflight).await;
            });
        }

        info!(bind_address = ?local_addr, "UDP listener stopped");
    }
}
