use std::sync::Arc;
use tokio::sync::watch;

/// Count of requests currently being handled, so shutdown can wait for them.
pub struct InflightRequests {
    count: watch::Sender<usize>,
}

impl Default for InflightRequests {
    fn default() -> Self {
        Self::new()
    }
}

impl InflightRequests {
    pub fn new() -> Self {
        let (count, _) = watch::channel(0);
        Self { count }
    }

    /// Counts one request until the returned guard is dropped. The guard is
    /// owned so it can be taken before a task is spawned and moved into it.
    pub fn enter(self: &Arc<Self>) -> InflightGuard {
        self.count.send_modify(|count| *count += 1);
        InflightGuard {
            tracker: Arc::clone(self),
        }
    }

    pub fn count(&self) -> usize {
        *self.count.borrow()
    }

    /// Resolves once no request is in flight.
    pub async fn wait_idle(&self) {
        let mut rx = self.count.subscribe();
        let _ = rx.wait_for(|count| *count == 0).await;
    }
}

pub struct InflightGuard {
    tracker: Arc<InflightRequests>,
}

impl Drop for InflightGuard {
    fn drop(&mut self) {
        self.tracker
            .count
            .send_modify(|count| *count = count.saturating_sub(1));
    }
}
