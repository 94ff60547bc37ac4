use super::sink::TcpResponseSink;
use crate::dns::forwarding::MessageBuilder;
use crate::dns::transport::tcp::read_with_length_prefix;
use ferrous_relay_application::use_cases::HandleDnsQueryUseCase;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Accepts connections and answers their queries one after another.
pub struct TcpDnsListener {
    listener: TcpListener,
    handler: Arc<HandleDnsQueryUseCase>,
    idle_timeout: Duration,
}

impl TcpDnsListener {
    pub async fn bind(
        addr: SocketAddr,
        handler: Arc<HandleDnsQueryUseCase>,
        idle_timeout: Duration,
    ) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            handler,
            idle_timeout,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub async fn run(self, shutdown: CancellationToken) {
        let local_addr = self.local_addr().ok();
        info!(
            bind_address = ?local_addr,
            idle_timeout_secs = self.idle_timeout.as_secs(),
            "TCP listener started"
        );

        loop {
            let (stream, peer) = tokio::select! {
                _ = shutdown.cancelled() => break,
                accepted = self.listener.accept() => match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        warn!(error = %e, "TCP accept error");
                        continue;
                    }
                },
            };

            tokio::spawn(serve_connection(
                stream,
                peer,
                Arc::clone(&self.handler),
                self.idle_timeout,
                shutdown.clone(),
            ));
        }

        info!(bind_address = ?local_addr, "TCP listener stopped");
    }
}

async fn serve_connection(
    mut stream: TcpStream,
    peer: SocketAddr,
    handler: Arc<HandleDnsQueryUseCase>,
    idle_timeout: Duration,
    shutdown: CancellationToken,
) {
    debug!(client = %peer, "TCP connection accepted");

    loop {
        let read = tokio::select! {
            _ = shutdown.cancelled() => break,
            read = tokio::time::timeout(idle_timeout, read_with_length_prefix(&mut stream)) => read,
        };

        let query_bytes = match read {
            Ok(Ok(bytes)) => bytes,
            Ok(Err(e)) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Ok(Err(e)) => {
                debug!(client = %peer, error = %e, "TCP read failed");
                break;
            }
            Err(_) => {
                debug!(client = %peer, "TCP connection idle, closing");
                break;
            }
        };

        let query = match MessageBuilder::parse_message(&query_bytes) {
            Ok(query) => query,
            Err(e) => {
                debug!(client = %peer, error = %e, "Dropping undecodable TCP query");
                break;
            }
        };

        let mut sink = TcpResponseSink::new(&mut stream);
        handler.handle(&query, &mut sink).await;
    }

    debug!(client = %peer, "TCP connection closed");
}
