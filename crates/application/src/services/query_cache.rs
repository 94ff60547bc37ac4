use dashmap::DashMap;
use ferrous_relay_domain::DomainError;
use hickory_proto::op::{Message, Query};
use rustc_hash::FxBuildHasher;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::debug;

type InflightOutcome = Option<Result<Arc<Message>, DomainError>>;
type InflightSender = Arc<watch::Sender<InflightOutcome>>;

/// Cache key of a single question: its canonical `name class type` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuestionKey(Arc<str>);

impl QuestionKey {
    pub fn new(question: &Query) -> Self {
        Self(Arc::from(format!("question:{}", question)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuestionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

struct CacheEntry {
    value: Arc<Message>,
    inserted_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.inserted_at) >= self.ttl
    }
}

enum Role {
    Leader(InflightSender),
    Follower(watch::Receiver<InflightOutcome>),
}

/// Removes the in-flight slot when the leader finishes or is dropped early.
/// Followers woken with no outcome go back and retry.
///
/// Only the slot this leader registered is ever removed; a later leader for
/// the same key owns its own sender.
struct InflightLeaderGuard<'a> {
    inflight: &'a DashMap<QuestionKey, InflightSender, FxBuildHasher>,
    key: &'a QuestionKey,
    tx: InflightSender,
    published: bool,
}

impl InflightLeaderGuard<'_> {
    fn publish(mut self, outcome: Result<Arc<Message>, DomainError>) {
        self.release();
        self.tx.send_replace(Some(outcome));
        self.published = true;
    }

    fn release(&self) {
        self.inflight
            .remove_if(self.key, |_, tx| Arc::ptr_eq(tx, &self.tx));
    }
}

impl Drop for InflightLeaderGuard<'_> {
    fn drop(&mut self) {
        if self.published {
            return;
        }
        self.release();
        self.tx.send_replace(None);
    }
}

/// Time-bounded store of upstream answers, one per question, with
/// single-flight resolution.
///
/// Entries expire lazily on lookup; `purge_expired` can be run periodically
/// to reclaim memory held by questions that are never asked again.
pub struct QueryCache {
    entries: DashMap<QuestionKey, CacheEntry, FxBuildHasher>,
    inflight: DashMap<QuestionKey, InflightSender, FxBuildHasher>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::with_hasher(FxBuildHasher),
            inflight: DashMap::with_hasher(FxBuildHasher),
        }
    }

    /// Return the live answer for `question`, or run `resolve` to get one.
    ///
    /// Concurrent callers missing on the same question share a single call
    /// to `resolve` and all observe its outcome. Failures are handed to every
    /// waiter but never stored. A zero `ttl` bypasses the cache entirely.
    pub async fn fetch_or_resolve<F, Fut>(
        &self,
        question: &Query,
        ttl: Duration,
        resolve: F,
    ) -> Result<Arc<Message>, DomainError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Message, DomainError>>,
    {
        if ttl.is_zero() {
            return resolve().await.map(Arc::new);
        }

        let key = QuestionKey::new(question);

        loop {
            if let Some(hit) = self.lookup(&key) {
                debug!(question = %key, "Cache HIT");
                return Ok(hit);
            }

            match self.register_or_join_inflight(&key) {
                Role::Leader(tx) => {
                    let guard = InflightLeaderGuard {
                        inflight: &self.inflight,
                        key: &key,
                        tx,
                        published: false,
                    };

                    // A previous leader may have stored the answer between our
                    // lookup and the registration.
                    let outcome = match self.lookup(&key) {
                        Some(hit) => Ok(hit),
                        None => {
                            debug!(question = %key, "Cache MISS");
                            let result = resolve().await.map(Arc::new);
                            if let Ok(answer) = &result {
                                self.store(key.clone(), Arc::clone(answer), ttl);
                            }
                            result
                        }
                    };

                    guard.publish(outcome.clone());
                    return outcome;
                }
                Role::Follower(mut rx) => {
                    if let Some(outcome) = Self::wait_for_leader(&mut rx).await {
                        debug!(
                            question = %key,
                            ok = outcome.is_ok(),
                            "Joined in-flight resolution"
                        );
                        return outcome;
                    }
                }
            }
        }
    }

    pub fn get(&self, question: &Query) -> Option<Arc<Message>> {
        self.lookup(&QuestionKey::new(question))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn inflight_len(&self) -> usize {
        self.inflight.len()
    }

    /// Drop every expired entry, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        let removed = before.saturating_sub(self.entries.len());

        if removed > 0 {
            debug!(removed, remaining = self.entries.len(), "Expired cache entries purged");
        }
        removed
    }

    fn lookup(&self, key: &QuestionKey) -> Option<Arc<Message>> {
        let now = Instant::now();

        {
            let entry = self.entries.get(key)?;
            if !entry.is_expired(now) {
                return Some(Arc::clone(&entry.value));
            }
        }

        self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        None
    }

    fn store(&self, key: QuestionKey, value: Arc<Message>, ttl: Duration) {
        self.entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: Instant::now(),
                ttl,
            },
        );
    }

    fn register_or_join_inflight(&self, key: &QuestionKey) -> Role {
        match self.inflight.entry(key.clone()) {
            dashmap::Entry::Occupied(e) => {
                let rx = e.get().subscribe();
                drop(e);
                Role::Follower(rx)
            }
            dashmap::Entry::Vacant(e) => {
                let (tx, _) = watch::channel(None);
                let tx = Arc::new(tx);
                e.insert(Arc::clone(&tx));
                Role::Leader(tx)
            }
        }
    }

    async fn wait_for_leader(
        rx: &mut watch::Receiver<InflightOutcome>,
    ) -> Option<Result<Arc<Message>, DomainError>> {
        let _ = rx.changed().await;
        rx.borrow().clone()
    }
}
