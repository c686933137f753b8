//! Keyed cache of server data.
//!
//! [`QueryCache`] maps a [`QueryKey`] to the last fetched JSON body plus its
//! status. Concurrent fetches of one key share a single in-flight request.
//! Writes reach readers only through invalidation: [`QueryCache::invalidate`]
//! marks matching entries stale and publishes an [`InvalidationEvent`];
//! every live [`QueryObserver`] of a matching key then re-fetches.
//!
//! The cache itself never fetches on its own. With no observer registered,
//! an invalidated entry stays stale until someone asks for it again.

use std::collections::HashMap;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt, Shared};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;
use upbreed_core::query_key::{KeyFilter, QueryKey};
use upbreed_events::{InvalidationBus, InvalidationEvent};

use crate::error::FetchError;
use crate::state::Loadable;

/// Produces the body for one key. Called once per actual network fetch.
pub type Fetcher = Arc<dyn Fn() -> BoxFuture<'static, Result<Value, FetchError>> + Send + Sync>;

type SharedFetch = Shared<BoxFuture<'static, Result<Value, FetchError>>>;

/// Wrap a typed async fetch function as a [`Fetcher`].
pub fn fetcher<T, E, F, Fut>(fetch: F) -> Fetcher
where
    T: Serialize,
    E: Into<FetchError>,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
{
    Arc::new(move || {
        let fut = fetch();
        async move {
            let value = fut.await.map_err(Into::into)?;
            serde_json::to_value(value).map_err(FetchError::decode)
        }
        .boxed()
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryStatus {
    /// No result yet.
    Pending,
    Success,
    /// The last fetch failed. Earlier data, if any, is kept.
    Error,
}

impl QueryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for QueryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only view of one cache entry.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryInfo {
    pub status: QueryStatus,
    pub is_stale: bool,
    pub is_fetching: bool,
    pub updated_at: Option<DateTime<Utc>>,
    pub error: Option<FetchError>,
}

struct Entry {
    data: Option<Value>,
    error: Option<FetchError>,
    status: QueryStatus,
    is_stale: bool,
    updated_at: Option<DateTime<Utc>>,
    in_flight: Option<SharedFetch>,
    /// Bumped whenever a fetch starts or an in-flight fetch is detached.
    generation: u64,
}

impl Entry {
    fn new() -> Self {
        Self {
            data: None,
            error: None,
            status: QueryStatus::Pending,
            is_stale: false,
            updated_at: None,
            in_flight: None,
            generation: 0,
        }
    }

    fn is_fresh(&self) -> bool {
        self.status == QueryStatus::Success && !self.is_stale && self.data.is_some()
    }
}

struct CacheInner {
    entries: Mutex<HashMap<QueryKey, Entry>>,
    bus: Arc<InvalidationBus>,
}

/// Shared resource cache. Clones share the same entries.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<CacheInner>,
}

impl QueryCache {
    pub fn new(bus: Arc<InvalidationBus>) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                entries: Mutex::new(HashMap::new()),
                bus,
            }),
        }
    }

    pub fn bus(&self) -> &Arc<InvalidationBus> {
        &self.inner.bus
    }

    /// Return fresh cached data for `key`, or fetch it.
    ///
    /// A fetch already in flight for `key` is joined rather than repeated.
    /// The result is written to the cache even if every caller goes away.
    pub async fn fetch(&self, key: &QueryKey, fetcher: &Fetcher) -> Result<Value, FetchError> {
        let shared = {
            let mut entries = self.lock();
            let entry = entries.entry(key.clone()).or_insert_with(Entry::new);
            if entry.is_fresh() {
                if let Some(data) = &entry.data {
                    tracing::trace!(key = %key, "Cache hit");
                    return Ok(data.clone());
                }
            }
            match &entry.in_flight {
                Some(in_flight) => in_flight.clone(),
                None => {
                    entry.generation += 1;
                    if entry.data.is_none() {
                        entry.status = QueryStatus::Pending;
                    }
                    let fut = fetcher().shared();
                    entry.in_flight = Some(fut.clone());
                    tracing::debug!(key = %key, "Fetching");
                    self.spawn_settle(key.clone(), entry.generation, fut.clone());
                    fut
                }
            }
        };
        shared.await
    }

    /// Mark every entry matching `filter` stale and announce it.
    ///
    /// In-flight fetches of those entries are detached: their results are
    /// still delivered to whoever awaits them, but not written back.
    /// Returns the number of entries marked.
    pub fn invalidate(&self, filter: impl Into<KeyFilter>) -> usize {
        self.invalidate_event(InvalidationEvent::new(filter))
    }

    pub fn invalidate_because(&self, filter: impl Into<KeyFilter>, reason: &str) -> usize {
        self.invalidate_event(InvalidationEvent::new(filter).with_reason(reason))
    }

    fn invalidate_event(&self, event: InvalidationEvent) -> usize {
        let marked = {
            let mut entries = self.lock();
            let mut marked = 0;
            for (_, entry) in entries.iter_mut().filter(|(k, _)| event.affects(k)) {
                entry.is_stale = true;
                if entry.in_flight.take().is_some() {
                    entry.generation += 1;
                }
                marked += 1;
            }
            marked
        };
        tracing::info!(filter = %event.filter, entries = marked, "Invalidated queries");
        self.inner.bus.publish(event);
        marked
    }

    /// Cached data for `key`, stale or not.
    pub fn get_data<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let data = self.lock().get(key)?.data.clone()?;
        serde_json::from_value(data).ok()
    }

    pub fn status(&self, key: &QueryKey) -> Option<QueryStatus> {
        self.lock().get(key).map(|e| e.status)
    }

    pub fn info(&self, key: &QueryKey) -> Option<EntryInfo> {
        self.lock().get(key).map(|e| EntryInfo {
            status: e.status,
            is_stale: e.is_stale,
            is_fetching: e.in_flight.is_some(),
            updated_at: e.updated_at,
            error: e.error.clone(),
        })
    }

    pub fn is_stale(&self, key: &QueryKey) -> bool {
        self.lock().get(key).is_some_and(|e| e.is_stale)
    }

    /// Drop every entry matching `filter`. Pending fetches for them are
    /// discarded when they land.
    pub fn remove(&self, filter: impl Into<KeyFilter>) -> usize {
        let filter = filter.into();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|key, _| !key.matches(&filter));
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Register an observer that keeps `key` loaded.
    ///
    /// The observer fetches immediately and again after every invalidation
    /// that matches `key`, until it is unmounted or dropped.
    pub fn observe<T>(&self, key: QueryKey, fetcher: Fetcher) -> QueryObserver<T>
    where
        T: DeserializeOwned + Clone + Send + Sync + 'static,
    {
        QueryObserver::spawn(self.clone(), key, fetcher)
    }

    fn spawn_settle(&self, key: QueryKey, generation: u64, fut: SharedFetch) {
        let cache = self.clone();
        tokio::spawn(async move {
            let result = fut.await;
            cache.settle(&key, generation, result);
        });
    }

    fn settle(&self, key: &QueryKey, generation: u64, result: Result<Value, FetchError>) {
        let mut entries = self.lock();
        let Some(entry) = entries.get_mut(key).filter(|e| e.generation == generation) else {
            tracing::debug!(key = %key, "Discarding superseded fetch result");
            return;
        };
        entry.in_flight = None;
        match result {
            Ok(data) => {
                entry.data = Some(data);
                entry.error = None;
                entry.status = QueryStatus::Success;
                entry.is_stale = false;
                entry.updated_at = Some(Utc::now());
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Query failed");
                entry.error = Some(e);
                entry.status = QueryStatus::Error;
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry>> {
        self.inner.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

// ---------------------------------------------------------------------------
// QueryObserver
// ---------------------------------------------------------------------------

/// A live subscription to one cache key.
///
/// Publishes [`Loadable`] states through a `watch` channel. After the first
/// successful load, re-fetches keep showing the previous data until the new
/// result lands; a re-fetch after an error shows `Pending` again.
pub struct QueryObserver<T> {
    key: QueryKey,
    state: watch::Receiver<Loadable<T>>,
    cancel: CancellationToken,
    _marker: PhantomData<fn() -> T>,
}

impl<T> QueryObserver<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    fn spawn(cache: QueryCache, key: QueryKey, fetcher: Fetcher) -> Self {
        let initial = match cache.get_data::<T>(&key) {
            Some(data) => Loadable::Ready(data),
            None => Loadable::Pending,
        };
        let (tx, rx) = watch::channel(initial);
        let cancel = CancellationToken::new();
        // Subscribe before the first fetch so no invalidation is missed.
        let events = cache.bus().subscribe();

        tokio::spawn(observe_loop(
            cache,
            key.clone(),
            fetcher,
            tx,
            events,
            cancel.clone(),
        ));

        Self {
            key,
            state: rx,
            cancel,
            _marker: PhantomData,
        }
    }

    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    pub fn current(&self) -> Loadable<T> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Loadable<T>> {
        self.state.clone()
    }

    /// Wait for the next state change. Returns `false` once the observer
    /// has stopped.
    pub async fn changed(&mut self) -> bool {
        self.state.changed().await.is_ok()
    }

    /// Wait until the state is no longer `Pending`.
    pub async fn settled(&mut self) -> Loadable<T> {
        let settled = self
            .state
            .wait_for(|s| !s.is_pending())
            .await
            .map(|s| s.clone());
        settled.unwrap_or_else(|_| self.current())
    }

    /// Stop observing. Results that land afterwards are discarded.
    pub fn unmount(&self) {
        self.cancel.cancel();
    }

    pub fn is_mounted(&self) -> bool {
        !self.cancel.is_cancelled()
    }
}

impl<T> Drop for QueryObserver<T> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn observe_loop<T>(
    cache: QueryCache,
    key: QueryKey,
    fetcher: Fetcher,
    tx: watch::Sender<Loadable<T>>,
    mut events: broadcast::Receiver<InvalidationEvent>,
    cancel: CancellationToken,
) where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    loop {
        if tx.borrow().is_error() {
            tx.send_replace(Loadable::Pending);
        }

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            result = cache.fetch(&key, &fetcher) => result,
        };
        let next = result.and_then(|value| serde_json::from_value::<T>(value).map_err(FetchError::decode));
        if cancel.is_cancelled() {
            return;
        }
        if invalidated_while_fetching(&mut events, &key) {
            tracing::debug!(key = %key, "Invalidated during fetch, discarding result");
            continue;
        }
        tx.send_replace(Loadable::from(next));

        loop {
            let event = tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                event = events.recv() => event,
            };
            match event {
                Ok(event) if event.affects(&key) => break,
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(key = %key, skipped, "Observer lagged, refetching");
                    break;
                }
                Err(broadcast::error::RecvError::Closed) => return,
            }
        }
        tracing::debug!(key = %key, "Refetching after invalidation");
    }
}

/// Drain events queued while a fetch was running. True when one of them
/// touches `key`, or when the receiver lagged and some may have.
fn invalidated_while_fetching(events: &mut broadcast::Receiver<InvalidationEvent>, key: &QueryKey) -> bool {
    let mut invalidated = false;
    loop {
        match events.try_recv() {
            Ok(event) => invalidated |= event.affects(key),
            Err(broadcast::error::TryRecvError::Lagged(_)) => invalidated = true,
            Err(broadcast::error::TryRecvError::Empty | broadcast::error::TryRecvError::Closed) => {
                return invalidated
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use upbreed_core::query_key::Resource;

    use super::*;

    fn counting_fetcher(counter: Arc<AtomicUsize>, delay: Duration) -> Fetcher {
        fetcher(move || {
            let counter = counter.clone();
            async move {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                tokio::time::sleep(delay).await;
                Ok::<_, FetchError>(vec![n])
            }
        })
    }

    /// Let spawned settle tasks write their results.
    async fn settle() {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    fn cache() -> QueryCache {
        QueryCache::new(Arc::new(InvalidationBus::default()))
    }

    fn page(n: u32) -> QueryKey {
        QueryKey::new(Resource::Courses).with("page", Some(n))
    }

    #[tokio::test]
    async fn concurrent_fetches_share_one_request() {
        let cache = cache();
        let calls = Arc::new(AtomicUsize::new(0));
        let f = counting_fetcher(calls.clone(), Duration::from_millis(20));
        let key = page(1);

        let (a, b) = tokio::join!(cache.fetch(&key, &f), cache.fetch(&key, &f));
        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn fresh_entry_is_served_from_cache() {
        let cache = cache();
        let calls = Arc::new(AtomicUsize::new(0));
        let f = counting_fetcher(calls.clone(), Duration::ZERO);
        let key = page(1);

        cache.fetch(&key, &f).await.unwrap();
        settle().await;
        cache.fetch(&key, &f).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.status(&key), Some(QueryStatus::Success));
        assert_eq!(cache.get_data::<Vec<usize>>(&key), Some(vec![1]));
    }

    #[tokio::test]
    async fn invalidate_marks_family_stale_without_fetching() {
        let cache = cache();
        let calls = Arc::new(AtomicUsize::new(0));
        let f = counting_fetcher(calls.clone(), Duration::ZERO);
        cache.fetch(&page(1), &f).await.unwrap();
        cache.fetch(&page(2), &f).await.unwrap();
        settle().await;

        let marked = cache.invalidate(Resource::Courses);

        assert_eq!(marked, 2);
        assert!(cache.is_stale(&page(1)));
        assert!(cache.is_stale(&page(2)));
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn invalidate_with_unknown_key_is_harmless() {
        let cache = cache();
        assert_eq!(cache.invalidate(Resource::Blogs), 0);
    }

    #[tokio::test]
    async fn failed_fetch_keeps_previous_data() {
        let cache = cache();
        let key = page(1);
        let ok = fetcher(|| async { Ok::<_, FetchError>(vec![7]) });
        let failing = fetcher(|| async { Err::<Vec<u32>, _>(FetchError::new("boom")) });

        cache.fetch(&key, &ok).await.unwrap();
        settle().await;
        cache.invalidate(Resource::Courses);
        assert!(cache.fetch(&key, &failing).await.is_err());
        settle().await;

        assert_eq!(cache.status(&key), Some(QueryStatus::Error));
        assert_eq!(cache.get_data::<Vec<u32>>(&key), Some(vec![7]));
    }

    #[tokio::test]
    async fn observer_refetches_on_matching_invalidation() {
        let cache = cache();
        let calls = Arc::new(AtomicUsize::new(0));
        let mut observer: QueryObserver<Vec<usize>> =
            cache.observe(page(1), counting_fetcher(calls.clone(), Duration::ZERO));

        assert_eq!(observer.settled().await, Loadable::Ready(vec![1]));

        cache.invalidate(Resource::Instructors);
        cache.invalidate(Resource::Courses);
        assert!(observer.changed().await);
        assert_eq!(observer.current(), Loadable::Ready(vec![2]));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn unmounted_observer_stops_fetching() {
        let cache = cache();
        let calls = Arc::new(AtomicUsize::new(0));
        let mut observer: QueryObserver<Vec<usize>> =
            cache.observe(page(1), counting_fetcher(calls.clone(), Duration::ZERO));
        observer.settled().await;

        observer.unmount();
        settle().await;
        cache.invalidate(Resource::Courses);
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!observer.is_mounted());
    }

    #[tokio::test(start_paused = true)]
    async fn observer_never_shows_data_fetched_before_an_invalidation() {
        let cache = cache();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::new(Resource::Instructors);
        let observer: QueryObserver<Vec<usize>> =
            cache.observe(key, counting_fetcher(calls.clone(), Duration::from_millis(100)));
        let mut states = observer.subscribe();

        tokio::time::sleep(Duration::from_millis(50)).await;
        cache.invalidate(Resource::Instructors);

        let first = states.wait_for(|s| !s.is_pending()).await.unwrap().clone();
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(first, Loadable::Ready(vec![2]));
        assert_eq!(observer.current(), Loadable::Ready(vec![2]));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn observer_reports_errors() {
        let cache = cache();
        let mut observer: QueryObserver<Vec<u32>> = cache.observe(
            page(1),
            fetcher(|| async { Err::<Vec<u32>, _>(FetchError::new("offline").with_status(503)) }),
        );

        let state = observer.settled().await;
        assert_eq!(state.error().and_then(FetchError::status), Some(503));
    }
}
