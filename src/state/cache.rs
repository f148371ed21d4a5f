/// Client-side response cache for list queries
///
/// Entries are keyed by the full query. A fetch is issued through a
/// `FetchTicket` that remembers the key and the cache epoch it was issued
/// in, and its result is stored under that key only, so a slow response for
/// an old query can never overwrite a newer one. Invalidation bumps the
/// epoch; results fetched in an older epoch are still shown but re-fetched
/// on the next read.
///
/// Storage is a bounded `moka` cache: keys nobody has read for a while are
/// dropped, and so are the least recently used ones once the capacity is
/// reached. A dropped key simply reads as `Idle` again.

use moka::policy::EvictionPolicy;
use moka::sync::Cache;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use crate::api::ApiError;

/// Distinct queries kept at once
pub const CACHE_CAPACITY: u64 = 64;
/// How long an unread query stays cached
pub const CACHE_IDLE: Duration = Duration::from_secs(5 * 60);

/// Proof that a fetch for `key` was issued
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket<K> {
    pub key: K,
    pub epoch: u64,
}

#[derive(Debug)]
struct Entry<V> {
    data: Option<Arc<V>>,
    error: Option<ApiError>,
    in_flight: bool,
    /// Epoch the last result was fetched in
    epoch: u64,
}

impl<V> Entry<V> {
    fn is_settled(&self) -> bool {
        self.data.is_some() || self.error.is_some()
    }
}

/// What a reader sees for one key
#[derive(Debug, PartialEq)]
pub enum QueryState<V> {
    /// Never requested, or evicted
    Idle,
    /// Requested, nothing to show yet
    Loading,
    Failed(ApiError),
    /// Data is shown even while a stale entry is being re-fetched
    Ready(Arc<V>),
}

pub struct QueryCache<K, V> {
    entries: Cache<K, Arc<Entry<V>>>,
    epoch: u64,
}

impl<K, V> fmt::Debug for QueryCache<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryCache")
            .field("entries", &self.entries.entry_count())
            .field("epoch", &self.epoch)
            .finish()
    }
}

impl<K, V> Default for QueryCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::with_limits(CACHE_CAPACITY, CACHE_IDLE)
    }
}

impl<K, V> QueryCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(capacity: u64, idle: Duration) -> Self {
        let entries = Cache::builder()
            .max_capacity(capacity)
            .time_to_idle(idle)
            .eviction_policy(EvictionPolicy::lru())
            .build();
        Self { entries, epoch: 0 }
    }

    /// Start a fetch for `key` unless one is running or a fresh result exists
    pub fn begin_fetch(&mut self, key: &K) -> Option<FetchTicket<K>> {
        let current = self.entries.get(key);
        if let Some(entry) = &current {
            if entry.in_flight || (entry.is_settled() && entry.epoch == self.epoch) {
                return None;
            }
        }

        let pending = match current {
            Some(entry) => Entry {
                data: entry.data.clone(),
                error: entry.error.clone(),
                in_flight: true,
                epoch: entry.epoch,
            },
            None => Entry {
                data: None,
                error: None,
                in_flight: true,
                epoch: self.epoch,
            },
        };
        self.entries.insert(key.clone(), Arc::new(pending));

        Some(FetchTicket {
            key: key.clone(),
            epoch: self.epoch,
        })
    }

    /// Store a fetch result under the key it was issued for. A failure keeps
    /// the previous data around but reports the error.
    pub fn complete(&mut self, ticket: FetchTicket<K>, result: Result<V, ApiError>) {
        let previous = self.entries.get(&ticket.key);
        let (data, error) = match result {
            Ok(data) => (Some(Arc::new(data)), None),
            Err(err) => (previous.and_then(|entry| entry.data.clone()), Some(err)),
        };

        self.entries.insert(
            ticket.key,
            Arc::new(Entry {
                data,
                error,
                in_flight: false,
                epoch: ticket.epoch,
            }),
        );
    }

    /// Mark every entry stale so the next read re-fetches
    pub fn invalidate_all(&mut self) {
        self.epoch += 1;
        tracing::debug!(epoch = self.epoch, entries = self.entries.entry_count(), "cache invalidated");
    }

    pub fn state(&self, key: &K) -> QueryState<V> {
        match self.entries.get(key) {
            None => QueryState::Idle,
            Some(entry) => match (&entry.error, &entry.data) {
                (Some(err), _) => QueryState::Failed(err.clone()),
                (None, Some(data)) => QueryState::Ready(Arc::clone(data)),
                (None, None) if entry.in_flight => QueryState::Loading,
                (None, None) => QueryState::Idle,
            },
        }
    }

    pub fn is_fetching(&self, key: &K) -> bool {
        self.entries.get(key).map_or(false, |entry| entry.in_flight)
    }

    #[cfg(test)]
    fn entry_count(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }
}
