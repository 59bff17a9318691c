//! Response cache keyed by string with tag-based bulk invalidation.
//!
//! Entries carry a payload (a pre-serialized response body), an expiry and a
//! set of tags. Invalidating a tag drops every entry carrying it in one step
//! under the state lock, so once [`TagCache::invalidate_tags`] returns no
//! reader can observe an entry stored under that tag before the call.
//!
//! Fills going through [`TagCache::get_or_try_insert_with`] are collapsed per
//! key and are discarded when one of their tags was invalidated while the fill
//! was running.

mod state;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use state::State;

/// Cached, already serialized response body.
pub type Payload = Arc<str>;

/// Whether a lookup was served from the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
        }
    }
}

/// Cloneable handle to a shared tag cache.
#[derive(Clone, Default)]
pub struct TagCache {
    shared: Arc<Shared>,
}

#[derive(Default)]
struct Shared {
    state: Mutex<State>,
    flights: DashMap<String, Arc<tokio::sync::Mutex<()>>>,
}

impl TagCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache holding at most `max_entries`; storing beyond that evicts the
    /// oldest entries first.
    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State::with_capacity(max_entries)),
                flights: DashMap::new(),
            }),
        }
    }

    /// Live payload stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<Payload> {
        self.shared.state.lock().lookup(key, Instant::now())
    }

    /// Store `payload` under `key`, replacing any previous entry.
    pub fn insert(&self, key: &str, payload: impl Into<Payload>, tags: &[&str], ttl: Duration) {
        let expires_at = Instant::now() + ttl;
        self.shared
            .state
            .lock()
            .store(key, payload.into(), tags, expires_at);
    }

    /// Drop every entry carrying one of `tags`. Returns the number of entries removed.
    pub fn invalidate_tags(&self, tags: &[&str]) -> usize {
        let removed = self.shared.state.lock().invalidate(tags);
        tracing::debug!(?tags, removed, "cache tags invalidated");
        removed
    }

    /// Drop expired entries. Returns the number of entries removed.
    pub fn purge_expired(&self) -> usize {
        self.shared.state.lock().purge_expired(Instant::now())
    }

    /// Number of stored entries, expired ones included until they are purged.
    pub fn len(&self) -> usize {
        self.shared.state.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the payload under `key`, or run `fetch` and store its result.
    ///
    /// Concurrent misses on the same key run `fetch` once; the other callers
    /// wait and are then served from the cache. A fetched value is still
    /// returned but not stored when one of `tags` was invalidated meanwhile.
    /// Errors from `fetch` are returned as-is and nothing is stored.
    pub async fn get_or_try_insert_with<F, Fut, E>(
        &self,
        key: &str,
        tags: &[&str],
        ttl: Duration,
        fetch: F,
    ) -> Result<(Payload, CacheStatus), E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, E>>,
    {
        if let Some(payload) = self.get(key) {
            tracing::debug!(key, "cache hit");
            return Ok((payload, CacheStatus::Hit));
        }

        let flight = self
            .shared
            .flights
            .entry(key.to_owned())
            .or_default()
            .clone();
        let guard = flight.lock().await;

        // Another caller may have filled the key while we waited.
        if let Some(payload) = self.get(key) {
            drop(guard);
            self.release_flight(key, &flight);
            tracing::debug!(key, "cache hit after waiting on fill");
            return Ok((payload, CacheStatus::Hit));
        }

        let generation = self.shared.state.lock().generation(tags);
        let result = fetch().await;

        let outcome = result.map(|body| {
            let payload: Payload = body.into();
            let expires_at = Instant::now() + ttl;
            let stored = self.shared.state.lock().store_if_current(
                key,
                payload.clone(),
                tags,
                expires_at,
                generation,
            );
            if stored {
                tracing::debug!(key, "cache miss; entry stored");
            } else {
                tracing::debug!(key, "cache miss; tags invalidated during fill, entry dropped");
            }
            (payload, CacheStatus::Miss)
        });

        drop(guard);
        self.release_flight(key, &flight);
        outcome
    }

    /// Purge expired entries every `interval` until the handle is aborted.
    pub fn spawn_sweeper(&self, interval: Duration) -> JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let purged = cache.purge_expired();
                if purged > 0 {
                    tracing::debug!(purged, "expired cache entries purged");
                }
            }
        })
    }

    fn release_flight(&self, key: &str, flight: &Arc<tokio::sync::Mutex<()>>) {
        // The map and `flight` hold two references; more means someone is waiting.
        self.shared
            .flights
            .remove_if(key, |_, current| {
                Arc::ptr_eq(current, flight) && Arc::strong_count(current) <= 2
            });
    }
}
