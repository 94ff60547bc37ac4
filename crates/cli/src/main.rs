use clap::Parser;
use ferrous_relay_domain::CliOverrides;
use ferrous_relay_infrastructure::jobs::CacheSweepJob;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

mod bootstrap;
mod di;
mod server;

#[derive(Parser)]
#[command(name = "ferrous-relay")]
#[command(version)]
#[command(about = "Ferrous Relay - caching DNS forwarder with per-domain upstream routing")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// DNS server port
    #[arg(short = 'd', long)]
    dns_port: Option<u16>,

    /// Bind address
    #[arg(short = 'b', long)]
    bind: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        dns_port: cli.dns_port,
        bind_address: cli.bind.clone(),
        log_level: cli.log_level.clone(),
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;

    bootstrap::init_logging(&config)?;

    info!("Starting Ferrous Relay v{}", env!("CARGO_PKG_VERSION"));

    let dns_services = di::DnsServices::new(&config);
    let shutdown = CancellationToken::new();

    if let Some(interval) = config.cache.sweep_interval() {
        CacheSweepJob::new(dns_services.cache.clone(), interval)
            .with_cancellation(shutdown.clone())
            .start();
    }

    let mut listeners = server::start_dns_server(
        &config.server,
        dns_services.handler.clone(),
        shutdown.clone(),
    )
    .await?;

    tokio::select! {
        _ = wait_for_signal() => {
            info!("Shutdown signal received");
        }
        Some(result) = listeners.join_next() => {
            if let Err(e) = result {
                error!(error = %e, "DNS listener task failed");
            }
        }
    }

    shutdown.cancel();
    while listeners.join_next().await.is_some() {}

    let inflight = dns_services.handler.inflight();
    info!(inflight = inflight.count(), "Waiting for in-flight queries");
    inflight.wait_idle().await;

    info!("Server shutdown complete");
    Ok(())
}

async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(e) => {
                error!(error = %e, "Unable to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
