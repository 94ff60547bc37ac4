use ferrous_relay_application::use_cases::HandleDnsQueryUseCase;
use ferrous_relay_domain::{Protocol, ServerConfig};
use ferrous_relay_infrastructure::dns::{TcpDnsListener, UdpDnsListener};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Binds every configured listener, then spawns their loops. Bind failures
/// surface here, before anything is served.
pub async fn start_dns_server(
    server: &ServerConfig,
    handler: Arc<HandleDnsQueryUseCase>,
    shutdown: CancellationToken,
) -> anyhow::Result<JoinSet<()>> {
    let socket_addr: SocketAddr = server.listen_addr().parse()?;
    let idle_timeout = Duration::from_secs(server.tcp_idle_timeout_secs);
    let mut join_set = JoinSet::new();

    for protocol in &server.protocols {
        match protocol {
            Protocol::Udp => {
                let listener = UdpDnsListener::bind(socket_addr, Arc::clone(&handler)).await?;
                join_set.spawn(listener.run(shutdown.clone()));
            }
            Protocol::Tcp => {
                let listener =
                    TcpDnsListener::bind(socket_addr, Arc::clone(&handler), idle_timeout).await?;
                join_set.spawn(listener.run(shutdown.clone()));
            }
        }
    }

    info!(
        bind_address = %socket_addr,
        protocols = ?server.protocols,
        "DNS server ready"
    );

    Ok(join_set)
}
