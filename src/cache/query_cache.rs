// ============================================================================
// src/cache/query_cache.rs - Keyed page cache with in-flight de-duplication
// ============================================================================
//
// - One network fetch per distinct PageRequest at a time; every concurrent
//   caller awaits the same shared future.
// - Completed pages live in an LRU keyed by the full request.
// - A caller dropping its future withdraws interest. The fetch itself is
//   dropped only when no caller is left.
// - A late result is written only into the slot of the fetch that produced it.
// - invalidate() detaches in-flight fetches: their waiters still get the old
//   result, and the next fetch of the same key starts a new request. Only then
//   can two requests for one key be in flight at once.
//
// ============================================================================

use crate::connection::Transport;
use crate::core::{PageRequest, PageResponse, Result};
use futures::future::{BoxFuture, FutureExt, Shared};
use lru::LruCache;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::{Instrument, debug, info_span, warn};

type SharedFetch = Shared<BoxFuture<'static, Result<Arc<PageResponse>>>>;

struct CachedPage {
    page: Arc<PageResponse>,
    fetched_at: Instant,
}

struct InFlight {
    id: u64,
    future: SharedFetch,
    interest: usize,
}

struct CacheState {
    pages: LruCache<PageRequest, CachedPage>,
    in_flight: HashMap<PageRequest, InFlight>,
    next_id: u64,
    hits: u64,
    joins: u64,
    fetches: u64,
}

impl CacheState {
    fn fresh(&mut self, request: &PageRequest, stale_after: Option<Duration>) -> Option<Arc<PageResponse>> {
        let cached = self.pages.get(request)?;
        match stale_after {
            Some(age) if cached.fetched_at.elapsed() >= age => None,
            _ => Some(Arc::clone(&cached.page)),
        }
    }
}

/// Counters exposed for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub cached_pages: usize,
    pub in_flight: usize,
    pub hits: u64,
    pub joins: u64,
    pub fetches: u64,
}

/// Shared page cache in front of a [`Transport`].
///
/// Cloning is cheap; clones share the same cache.
#[derive(Clone)]
pub struct QueryCache {
    transport: Arc<dyn Transport>,
    state: Arc<Mutex<CacheState>>,
    stale_after: Option<Duration>,
}

impl QueryCache {
    pub fn new(transport: Arc<dyn Transport>, capacity: NonZeroUsize) -> Self {
        Self {
            transport,
            state: Arc::new(Mutex::new(CacheState {
                pages: LruCache::new(capacity),
                in_flight: HashMap::new(),
                next_id: 0,
                hits: 0,
                joins: 0,
                fetches: 0,
            })),
            stale_after: None,
        }
    }

    /// Treat cached pages older than `age` as missing.
    pub fn with_stale_after(mut self, age: Option<Duration>) -> Self {
        self.stale_after = age;
        self
    }

    /// Cached page, or the result of the (possibly shared) network fetch.
    pub async fn fetch(&self, request: PageRequest) -> Result<Arc<PageResponse>> {
        self.fetch_inner(request, false).await
    }

    /// Skip the cached page but still join a fetch already in flight.
    pub async fn refetch(&self, request: PageRequest) -> Result<Arc<PageResponse>> {
        self.fetch_inner(request, true).await
    }

    async fn fetch_inner(&self, request: PageRequest, force: bool) -> Result<Arc<PageResponse>> {
        request.validate()?;

        let (interest, future) = {
            let mut guard = self.state.lock()?;
            let state = &mut *guard;

            if !force {
                if let Some(page) = state.fresh(&request, self.stale_after) {
                    state.hits += 1;
                    debug!(request = %request, "query cache hit");
                    return Ok(page);
                }
            }

            let (id, future) = match state.in_flight.get_mut(&request) {
                Some(entry) => {
                    entry.interest += 1;
                    state.joins += 1;
                    debug!(request = %request, waiters = entry.interest, "joining in-flight fetch");
                    (entry.id, entry.future.clone())
                }
                None => {
                    let id = state.next_id;
                    state.next_id += 1;
                    state.fetches += 1;

                    let future = Self::network_fetch(Arc::clone(&self.transport), request.clone())
                        .boxed()
                        .shared();
                    state.in_flight.insert(
                        request.clone(),
                        InFlight {
                            id,
                            future: future.clone(),
                            interest: 1,
                        },
                    );
                    debug!(request = %request, "starting fetch");
                    (id, future)
                }
            };

            let interest = Interest {
                state: Arc::clone(&self.state),
                request,
                id,
                settled: false,
            };
            (interest, future)
        };

        let result = future.await;
        interest.settle(&result);
        result
    }

    async fn network_fetch(transport: Arc<dyn Transport>, request: PageRequest) -> Result<Arc<PageResponse>> {
        let span = info_span!("query_cache.fetch", request = %request);
        async move {
            let response = transport.get(&request.path(), &request.query_pairs()).await?;
            let page = response.into_page(request.page_size)?;
            debug!(items = page.items.len(), total = page.total_count, "page received");
            Ok(Arc::new(page))
        }
        .instrument(span)
        .await
    }

    /// Cached page for `request` without touching the network or LRU order.
    pub fn peek(&self, request: &PageRequest) -> Option<Arc<PageResponse>> {
        let state = self.lock();
        state.pages.peek(request).map(|cached| Arc::clone(&cached.page))
    }

    /// Rows to keep on screen while `next` loads: the cached page of `previous`,
    /// but only when the two requests differ in page index alone.
    pub fn placeholder(&self, previous: &PageRequest, next: &PageRequest) -> Option<Arc<PageResponse>> {
        if previous == next || !previous.same_query(next) {
            return None;
        }
        self.peek(previous)
    }

    /// Drop every cached page of `resource`. In-flight fetches for it keep
    /// serving their current waiters but their results are no longer cached,
    /// and later callers start a fresh request instead of joining them.
    pub fn invalidate(&self, resource: &str) {
        let mut guard = self.lock();
        let state = &mut *guard;

        let stale: Vec<PageRequest> = state
            .pages
            .iter()
            .filter(|(request, _)| request.resource == resource)
            .map(|(request, _)| request.clone())
            .collect();
        for request in &stale {
            state.pages.pop(request);
        }
        state.in_flight.retain(|request, _| request.resource != resource);

        debug!(resource, dropped = stale.len(), "invalidated resource");
    }

    pub fn invalidate_all(&self) {
        let mut state = self.lock();
        state.pages.clear();
        state.in_flight.clear();
    }

    pub fn in_flight_count(&self) -> usize {
        self.lock().in_flight.len()
    }

    pub fn cached_count(&self) -> usize {
        self.lock().pages.len()
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.lock();
        CacheStats {
            cached_pages: state.pages.len(),
            in_flight: state.in_flight.len(),
            hits: state.hits,
            joins: state.joins,
            fetches: state.fetches,
        }
    }

    // Read-only paths keep working after a panic elsewhere poisoned the lock.
    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// One caller's claim on an in-flight fetch.
struct Interest {
    state: Arc<Mutex<CacheState>>,
    request: PageRequest,
    id: u64,
    settled: bool,
}

impl Interest {
    fn settle(mut self, result: &Result<Arc<PageResponse>>) {
        self.settled = true;

        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let state = &mut *guard;

        let owns_slot = state
            .in_flight
            .get(&self.request)
            .is_some_and(|entry| entry.id == self.id);
        if !owns_slot {
            // Another waiter already settled this fetch, or the slot was invalidated
            return;
        }
        state.in_flight.remove(&self.request);

        match result {
            Ok(page) => {
                state.pages.put(
                    self.request.clone(),
                    CachedPage {
                        page: Arc::clone(page),
                        fetched_at: Instant::now(),
                    },
                );
            }
            Err(err) => {
                warn!(request = %self.request, error = %err, "fetch failed");
            }
        }
    }
}

impl Drop for Interest {
    fn drop(&mut self) {
        if self.settled {
            return;
        }

        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let state = &mut *guard;

        let abandoned = match state.in_flight.get_mut(&self.request) {
            Some(entry) if entry.id == self.id => {
                entry.interest = entry.interest.saturating_sub(1);
                entry.interest == 0
            }
            _ => false,
        };

        if abandoned {
            state.in_flight.remove(&self.request);
            debug!(request = %self.request, "no waiters left, dropping fetch");
        }
    }
}
