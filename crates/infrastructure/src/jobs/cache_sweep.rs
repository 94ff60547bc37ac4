use ferrous_relay_application::services::QueryCache;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Periodically drops expired answers that nobody asked for again.
pub struct CacheSweepJob {
    cache: Arc<QueryCache>,
    interval: Duration,
    shutdown: CancellationToken,
}

impl CacheSweepJob {
    pub fn new(cache: Arc<QueryCache>, interval: Duration) -> Self {
        Self {
            cache,
            interval,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub fn start(self) -> JoinHandle<()> {
        info!(
            interval_secs = self.interval.as_secs(),
            "Starting cache sweep job"
        );

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.interval);
            // The first tick fires immediately; nothing can have expired yet.
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        info!("CacheSweepJob: shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        let removed = self.cache.purge_expired();
                        if removed > 0 {
                            info!(
                                entries_removed = removed,
                                cache_size = self.cache.len(),
                                "Cache sweep completed"
                            );
                        }
                    }
                }
            }
        })
    }
}
