use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, instrument, trace};

use crate::constants::CACHE_GC_TIME_SECS;
use crate::domain::{QueryKey, TransportError};

type SharedFetch<T> = Shared<BoxFuture<'static, Result<Arc<T>, TransportError>>>;

struct InFlight<T> {
    generation: u64,
    future: SharedFetch<T>,
}

struct Entry<T> {
    data: Option<Arc<T>>,
    error: Option<TransportError>,
    updated_at: Option<Instant>,
    last_used: Instant,
    invalidated: bool,
    generation: u64,
    in_flight: Option<InFlight<T>>,
}

impl<T> Default for Entry<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            updated_at: None,
            last_used: Instant::now(),
            invalidated: false,
            generation: 0,
            in_flight: None,
        }
    }
}

impl<T> Entry<T> {
    fn fresh_data(&self, stale_time: Option<Duration>) -> Option<Arc<T>> {
        if self.invalidated {
            return None;
        }
        let data = self.data.as_ref()?;
        if let (Some(stale_time), Some(updated_at)) = (stale_time, self.updated_at) {
            if updated_at.elapsed() >= stale_time {
                return None;
            }
        }
        Some(Arc::clone(data))
    }
}

/// Snapshot of one cache entry as a consumer sees it.
///
/// `data` survives a failed refetch, so `is_error` and `data.is_some()` can
/// both hold.
#[derive(Debug)]
pub struct QueryState<T> {
    pub data: Option<Arc<T>>,
    pub error: Option<TransportError>,
    pub is_fetching: bool,
    pub is_stale: bool,
}

impl<T> QueryState<T> {
    fn idle() -> Self {
        Self {
            data: None,
            error: None,
            is_fetching: false,
            is_stale: true,
        }
    }

    /// First load of a key: a request is running and nothing is cached yet.
    pub fn is_loading(&self) -> bool {
        self.is_fetching && self.data.is_none()
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn is_success(&self) -> bool {
        self.data.is_some() && self.error.is_none()
    }
}

/// Client-side cache of query results keyed by [`QueryKey`].
///
/// Entries stay fresh until invalidated, or until `stale_time` elapses when
/// one is configured. At most one request per key is in flight; concurrent
/// callers for the same key await the same shared future. The lock is never
/// held across an await.
///
/// Entries not fetched for `gc_time` are evicted on the next `fetch`, unless
/// a request for them is still running.
pub struct QueryCache<T> {
    entries: Mutex<HashMap<QueryKey, Entry<T>>>,
    stale_time: Option<Duration>,
    gc_time: Option<Duration>,
}

impl<T> QueryCache<T>
where
    T: Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::with_stale_time(None)
    }

    pub fn with_stale_time(stale_time: Option<Duration>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            stale_time,
            gc_time: Some(Duration::from_secs(CACHE_GC_TIME_SECS)),
        }
    }

    /// `None` keeps every entry for the life of the cache.
    pub fn with_gc_time(mut self, gc_time: Option<Duration>) -> Self {
        self.gc_time = gc_time;
        self
    }

    /// Return the fresh value for `key`, or run `fetcher` (or join the
    /// request already running for `key`) and store its result.
    #[instrument(level = "debug", skip(self, key, fetcher), fields(key = %key))]
    pub async fn fetch<F, Fut>(&self, key: &QueryKey, fetcher: F) -> Result<Arc<T>, TransportError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, TransportError>> + Send + 'static,
    {
        let (generation, future) = {
            let mut entries = self.entries.lock().await;
            self.collect_garbage(&mut entries, key);
            let entry = entries.entry(key.clone()).or_default();
            entry.last_used = Instant::now();

            if let Some(data) = entry.fresh_data(self.stale_time) {
                debug!("Cache hit");
                return Ok(data);
            }

            match &entry.in_flight {
                Some(in_flight) => {
                    debug!(generation = in_flight.generation, "Joining in-flight request");
                    (in_flight.generation, in_flight.future.clone())
                }
                None => {
                    entry.generation += 1;
                    let future = fetcher().map(|r| r.map(Arc::new)).boxed().shared();
                    entry.in_flight = Some(InFlight {
                        generation: entry.generation,
                        future: future.clone(),
                    });
                    debug!(generation = entry.generation, "Starting request");
                    (entry.generation, future)
                }
            }
        };

        let result = future.await;
        self.settle(key, generation, &result).await;
        result
    }

    fn collect_garbage(&self, entries: &mut HashMap<QueryKey, Entry<T>>, keep: &QueryKey) {
        let Some(gc_time) = self.gc_time else {
            return;
        };
        let before = entries.len();
        entries.retain(|key, entry| {
            key == keep || entry.in_flight.is_some() || entry.last_used.elapsed() < gc_time
        });
        let evicted = before - entries.len();
        if evicted > 0 {
            trace!(evicted, "Evicted unused entries");
        }
    }

    async fn settle(&self, key: &QueryKey, generation: u64, result: &Result<Arc<T>, TransportError>) {
        let mut entries = self.entries.lock().await;
        let Some(entry) = entries.get_mut(key) else {
            return;
        };

        let is_current = entry
            .in_flight
            .as_ref()
            .is_some_and(|f| f.generation == generation);
        if !is_current {
            // Already settled by another waiter, or superseded by invalidation
            trace!(%key, generation, "Discarding superseded result");
            return;
        }

        entry.in_flight = None;
        match result {
            Ok(data) => {
                entry.data = Some(Arc::clone(data));
                entry.error = None;
                entry.updated_at = Some(Instant::now());
                entry.invalidated = false;
            }
            Err(e) => {
                debug!(%key, error = %e, "Request failed");
                entry.error = Some(e.clone());
            }
        }
    }

    pub async fn state(&self, key: &QueryKey) -> QueryState<T> {
        let entries = self.entries.lock().await;
        match entries.get(key) {
            None => QueryState::idle(),
            Some(entry) => QueryState {
                data: entry.data.clone(),
                error: entry.error.clone(),
                is_fetching: entry.in_flight.is_some(),
                is_stale: entry.fresh_data(self.stale_time).is_none(),
            },
        }
    }

    /// Whether `fetch` for `key` would be served without a request.
    pub async fn is_fresh(&self, key: &QueryKey) -> bool {
        let entries = self.entries.lock().await;
        entries
            .get(key)
            .is_some_and(|e| e.fresh_data(self.stale_time).is_some())
    }

    /// Mark every entry under `prefix` stale and drop its in-flight request.
    ///
    /// Cached data is kept so consumers can still show it while refetching.
    /// Returns the number of entries touched.
    #[instrument(level = "debug", skip(self, prefix), fields(prefix = %prefix))]
    pub async fn invalidate(&self, prefix: &QueryKey) -> usize {
        let mut entries = self.entries.lock().await;
        let mut count = 0;
        for (key, entry) in entries.iter_mut() {
            if key.starts_with(prefix) {
                entry.invalidated = true;
                entry.in_flight = None;
                count += 1;
            }
        }
        debug!(count, "Invalidated entries");
        count
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

impl<T> Default for QueryCache<T>
where
    T: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
